//! 通用常量.

/// 区室与预测类型的字符串名称. 与模型训练时使用的名称保持一致.
pub mod names {
    /// 全细胞区室.
    pub const WHOLE_CELL: &str = "whole-cell";

    /// 细胞核区室.
    pub const NUCLEAR: &str = "nuclear";

    /// 同时选择两个区室.
    pub const BOTH: &str = "both";

    /// 单通道的内部距离预测.
    pub const INNER_DISTANCE: &str = "inner-distance";

    /// 三通道 (边缘, 内部, 背景) 的逐像素分类预测.
    pub const PIXELWISE_INTERIOR: &str = "pixelwise-interior";
}

/// 模型原始输出列表的长度 (2 个区室 * 2 种预测).
pub const OUTPUT_LEN: usize = 4;

/// 逐像素分类预测中 "内部" 类别所在的通道.
pub const INTERIOR_CHANNEL: usize = 1;

/// 张量的通道维.
pub const CHANNEL_AXIS: usize = 3;

/// 前处理默认参数.
pub mod preprocess {
    /// 亮点截断时使用的百分位数.
    pub const PERCENTILE: f64 = 99.9;

    /// 自适应直方图均衡化的窗口大小 (像素).
    pub const KERNEL_SIZE: usize = 128;

    /// 直方图的 bin 个数.
    pub const NBINS: usize = 256;

    /// 直方图截断上限, 以窗口像素总数的比例表示.
    pub const CLIP_LIMIT: f64 = 0.01;
}

/// 分水岭后处理默认参数.
pub mod watershed {
    /// 内部距离极大值的最低门限.
    pub const MAXIMA_THRESHOLD: f32 = 0.05;

    /// 内部预测的前景门限.
    pub const INTERIOR_THRESHOLD: f32 = 0.3;

    /// 内部距离图的高斯平滑标准差. 0 表示不平滑.
    pub const MAXIMA_SMOOTH: f64 = 0.0;

    /// 内部预测图的高斯平滑标准差.
    pub const INTERIOR_SMOOTH: f64 = 2.0;

    /// 极大值检测窗口半径.
    pub const RADIUS: usize = 2;

    /// 小于该像素数的对象被移除. 0 表示不移除.
    pub const SMALL_OBJECTS_THRESHOLD: usize = 0;

    /// 小于该像素数的空洞被填充. 0 表示不填充.
    pub const FILL_HOLES_THRESHOLD: usize = 0;
}
