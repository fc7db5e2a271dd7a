use declift_isa::LiftError;
use thiserror::Error;

/// Pipeline errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("lift error: {0}")]
    Lift(#[from] LiftError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown architecture '{0}' (expected ppc-be, ppc-le or spu)")]
    UnknownArchitecture(String),
    #[error("architecture {arch} has no calling convention '{name}'")]
    UnknownConvention { arch: &'static str, name: String },
    #[error("function entry 0x{entry:x} is outside the image at 0x{base:x}+0x{len:x}")]
    EntryOutOfRange { entry: u64, base: u64, len: u64 },
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
