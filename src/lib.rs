pub mod cli;
pub mod element;
pub mod scenario;
pub mod trace;
// 导出 raii_seq 供项目内其他模块使用
pub use raii_seq;

pub use element::Element;
pub use scenario::{Growth, Options, Report, Strategy};
pub use trace::{Event, EventKind, Trace};
