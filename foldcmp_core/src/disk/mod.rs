pub mod local;

pub use local::LocalDisk;
