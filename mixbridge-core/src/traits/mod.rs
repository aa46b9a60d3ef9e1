pub mod encoder_control;
pub mod frame_sink;
pub mod loopback;
pub mod source_provider;
