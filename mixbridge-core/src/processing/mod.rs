pub mod frame_chunker;
pub mod frame_queue;
pub mod mix_bus;
