//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use log::info;
use plex_berry::pre_proc::multiplex_preprocess;
use std::thread;
use std::time::Instant;
use utils::loader;

/// normalize / threshold 的四种组合.
const MODES: [(&str, bool, bool); 4] = [
    ("raw", false, false),
    ("threshold", false, true),
    ("normalize", true, false),
    ("both", true, true),
];

/// 实际运行.
pub fn run() -> AblationResult {
    let image = loader::image_from_env_or_synthetic();
    info!("input image shape: {:?}", image.shape());

    println!("Running ablation studies...");
    thread::scope(|s| {
        let view = image.view();
        let handles = MODES.map(|(_, normalize, threshold)| {
            s.spawn(move || {
                let start = Instant::now();
                let output = multiplex_preprocess(view, normalize, threshold);
                Profile::new(output.view(), start.elapsed())
            })
        });

        AblationResult::from_iter(
            MODES.map(|(name, ..)| name).into_iter().zip(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            ),
        )
    })
}
