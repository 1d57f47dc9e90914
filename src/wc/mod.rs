pub mod chunk;
pub mod delim;
pub mod dispatch;
pub mod error;
pub mod plan;
pub mod reduce;
pub mod scan;


pub use self::chunk::*;
pub use self::delim::*;
pub use self::dispatch::*;
pub use self::error::*;
pub use self::plan::*;
pub use self::reduce::*;
pub use self::scan::*;
