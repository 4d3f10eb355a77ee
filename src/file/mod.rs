//! Loading things from disk: sample files, system tables, and the cache that
//! shares them.

mod cache;
mod samples;
mod system;

pub use cache::{ResourceCache, SampleFileKind};
pub use samples::{
    load_orientation_ascii, load_xyz_ascii, load_xyzv_ascii, load_xyzv_binary,
    write_orientation_ascii, write_xyz_ascii, write_xyzv_ascii, write_xyzv_binary,
};
pub use system::read_system;
