// src/drivers/mod.rs
// 声明同级目录下的子模块文件
pub mod acquire;
pub mod error;
pub mod feeltech;
pub mod fft;
pub mod instrument;
pub mod plot;
pub mod range;
pub mod report;
pub mod sample_rate;
pub mod simulated;
pub mod sweep;
// 公开导出这些模块里的结构体，方便外部调用
pub use acquire::DEFAULT_SETTLE;
pub use error::BodeError;
pub use feeltech::FeelTech;
pub use instrument::{Generator, Oscilloscope, ScopeSession};
pub use plot::{save_bode_png, PlotStyle};
pub use range::GainMode;
pub use report::write_csv_file;
pub use simulated::{FilterModel, SimulatedBench};
pub use sweep::{RangeStrategy, RetryPolicy, SweepDriver, SweepReport};
