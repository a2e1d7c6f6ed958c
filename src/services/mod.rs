pub mod completion;
pub mod lifecycle;
pub mod qc_board;
