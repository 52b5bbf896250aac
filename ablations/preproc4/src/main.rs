//! 前处理消融实验: 对比 normalize / threshold 的四种组合.

mod profile;
mod result;
mod runner;

fn main() {
    simple_logger::init_with_level(log::Level::Info).expect("Logger init error");
    runner::run().analyze();
}
