//! Shadow mapping

pub mod cascade;

pub use cascade::{
    CascadedShadowMap, build_cascade_view_projection, compute_split_distances, frustum_corners_world,
    near_far_from_projection,
};
