pub mod buffer_pool;
pub mod pipeline;
pub mod render;
pub mod saliency;
pub mod smoothing;

pub use buffer_pool::BufferPool;
pub use pipeline::{
    generate_heatmap, generate_heatmap_async, render_heatmap_bytes, HeatmapOutput,
    HeatmapPipeline,
};
pub use render::{HeatmapRenderer, RenderInput};
pub use saliency::{SaliencyMap, SaliencyStage};
pub use smoothing::SmoothingStage;
