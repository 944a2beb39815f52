pub mod channels;
pub mod erase_outline;
pub mod flatten_background;
pub mod pipeline;
pub mod refine_alpha;
pub mod segmenter;
