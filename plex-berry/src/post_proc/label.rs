//! 标签图的连通区域操作.

use std::collections::{HashSet, VecDeque};

use ndarray::{Array2, ArrayView2};

use crate::Idx2d;

/// 连通规则.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Connectivity {
    /// 4-相邻.
    Four,

    /// 8-相邻.
    Eight,
}

/// `neighbour8` 结果中属于 4-邻居的下标.
const N4_IN_N8: [usize; 4] = [1, 3, 4, 6];
const N8_ALL: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// 获得 `(h, w)` 的 8-邻居索引, 按行优先排列. 不检查越界.
#[inline]
fn neighbour8((h, w): Idx2d) -> [Idx2d; 8] {
    [
        (h.wrapping_sub(1), w.wrapping_sub(1)),
        (h.wrapping_sub(1), w),
        (h.wrapping_sub(1), w.saturating_add(1)),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
        (h.saturating_add(1), w.wrapping_sub(1)),
        (h.saturating_add(1), w),
        (h.saturating_add(1), w.saturating_add(1)),
    ]
}

impl Connectivity {
    /// 获得 `pos` 在形状为 `shape` 的图像内的所有邻居.
    pub fn neighbours(self, pos: Idx2d, (h, w): Idx2d) -> impl Iterator<Item = Idx2d> {
        let n8 = neighbour8(pos);
        let picked: &'static [usize] = match self {
            Self::Four => &N4_IN_N8,
            Self::Eight => &N8_ALL,
        };
        picked
            .iter()
            .map(move |&i| n8[i])
            .filter(move |&(y, x)| y < h && x < w)
    }
}

/// 给 `mask` 中为 `true` 的连通区域按行优先顺序编号 `1..=n`. 背景为 0.
///
/// 返回 (标签图, 区域个数 n).
pub fn label_components(mask: ArrayView2<bool>, conn: Connectivity) -> (Array2<u32>, u32) {
    let shape = mask.dim();
    let mut labels = Array2::<u32>::zeros(shape);
    let mut next = 0u32;
    let mut q = VecDeque::with_capacity(64);

    for (pos, &fg) in mask.indexed_iter() {
        if !fg || labels[pos] != 0 {
            continue;
        }
        next += 1;
        labels[pos] = next;
        q.push_back(pos);
        while let Some(cur) = q.pop_front() {
            for n in conn.neighbours(cur, shape) {
                if mask[n] && labels[n] == 0 {
                    labels[n] = next;
                    q.push_back(n);
                }
            }
        }
    }
    (labels, next)
}

/// 把像素数小于 `min_size` 的对象置为背景. `min_size` 为 0 时不做任何事.
pub fn remove_small_objects(labels: &mut Array2<u32>, min_size: usize) {
    if min_size == 0 {
        return;
    }
    let sizes = label_sizes(labels.view());
    labels.mapv_inplace(|v| {
        if v != 0 && sizes[v as usize] < min_size {
            0
        } else {
            v
        }
    });
}

/// 填充对象内部像素数小于 `max_size` 的背景空洞. `max_size` 为 0 时不做任何事.
///
/// 空洞指不接触图像边界, 且只被同一个对象 4-相邻包围的背景连通区域.
pub fn fill_holes(labels: &mut Array2<u32>, max_size: usize) {
    if max_size == 0 {
        return;
    }
    let shape @ (h, w) = labels.dim();
    let background = labels.mapv(|v| v == 0);
    let (holes, n) = label_components(background.view(), Connectivity::Four);

    let mut areas: Vec<Vec<Idx2d>> = vec![Vec::new(); n as usize + 1];
    for (pos, &id) in holes.indexed_iter() {
        if id != 0 {
            areas[id as usize].push(pos);
        }
    }

    for (id, area) in areas.iter().enumerate().skip(1) {
        if area.len() >= max_size
            || area
                .iter()
                .any(|&(y, x)| y == 0 || x == 0 || y + 1 == h || x + 1 == w)
        {
            continue;
        }
        let around: HashSet<u32> = area
            .iter()
            .flat_map(|&p| Connectivity::Four.neighbours(p, shape))
            .filter(|&q| holes[q] as usize != id)
            .map(|q| labels[q])
            .collect();
        if around.len() == 1 {
            if let Some(&owner) = around.iter().next() {
                area.iter().for_each(|&p| labels[p] = owner);
            }
        }
    }
}

/// 按行优先的首次出现顺序把标签重新编号为 `1..=m`. 返回 m.
pub fn relabel_sequential(labels: &mut Array2<u32>) -> u32 {
    let max = labels.iter().copied().max().unwrap_or(0) as usize;
    let mut table = vec![0u32; max + 1];
    let mut next = 0u32;
    for v in labels.iter_mut().filter(|v| **v != 0) {
        let slot = &mut table[*v as usize];
        if *slot == 0 {
            next += 1;
            *slot = next;
        }
        *v = *slot;
    }
    next
}

/// 每个标签的像素数, 以标签值为下标.
fn label_sizes(labels: ArrayView2<u32>) -> Vec<usize> {
    let max = labels.iter().copied().max().unwrap_or(0) as usize;
    let mut sizes = vec![0usize; max + 1];
    labels.iter().for_each(|&v| sizes[v as usize] += 1);
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_neighbours_in_bound() {
        let n: Vec<Idx2d> = Connectivity::Four.neighbours((0, 0), (3, 3)).collect();
        assert_eq!(n, vec![(0, 1), (1, 0)]);
        let n: Vec<Idx2d> = Connectivity::Eight.neighbours((1, 1), (3, 3)).collect();
        assert_eq!(n.len(), 8);
        let n: Vec<Idx2d> = Connectivity::Eight.neighbours((2, 2), (3, 3)).collect();
        assert_eq!(n, vec![(1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_label_components() {
        let mask = array![
            [true, false, false, true],
            [false, true, false, true],
            [false, false, false, false],
        ];
        let (four, n4) = label_components(mask.view(), Connectivity::Four);
        assert_eq!(n4, 3);
        assert_eq!(four, array![[1, 0, 0, 2], [0, 3, 0, 2], [0, 0, 0, 0]]);

        let (eight, n8) = label_components(mask.view(), Connectivity::Eight);
        assert_eq!(n8, 2);
        assert_eq!(eight[(1, 1)], eight[(0, 0)]);
    }

    #[test]
    fn test_remove_small_and_relabel() {
        let mut labels = array![[1, 1, 0, 3], [1, 1, 0, 0], [0, 0, 5, 5]];
        remove_small_objects(&mut labels, 2);
        assert_eq!(labels, array![[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 5, 5]]);
        assert_eq!(relabel_sequential(&mut labels), 2);
        assert_eq!(labels, array![[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 2, 2]]);
    }

    #[test]
    fn test_fill_holes() {
        let ring = array![
            [0, 0, 0, 0, 0],
            [0, 4, 4, 4, 0],
            [0, 4, 0, 4, 0],
            [0, 4, 4, 4, 0],
            [0, 0, 0, 0, 0],
        ];
        let mut untouched = ring.clone();
        fill_holes(&mut untouched, 0);
        assert_eq!(untouched, ring);

        let mut filled = ring.clone();
        fill_holes(&mut filled, 2);
        assert_eq!(filled[(2, 2)], 4);
        assert_eq!(filled[(0, 0)], 0);

        // 被两个对象包围的空洞不填充.
        let mut shared = ring.clone();
        shared[(1, 2)] = 7;
        fill_holes(&mut shared, 2);
        assert_eq!(shared[(2, 2)], 0);
    }
}
