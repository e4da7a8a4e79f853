//! Point cloud input and host/tensor conversion.

mod point_cloud;

pub use point_cloud::{points_from_tensor, points_to_tensor, PointCloud};
