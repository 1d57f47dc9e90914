/// Use mimalloc as the global allocator for the library and binary.
/// Chunk buffers are allocated per task, so thread-local caching matters
/// once the worker pool is wide.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod wc;
