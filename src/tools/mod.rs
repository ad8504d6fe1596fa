// ABOUTME: Command builders for the external collaborators.
// ABOUTME: Terraform provisions, docker builds and publishes, kubectl drives the cluster.

mod image;
mod kubectl;
mod terraform;

pub use image::ImageBuilder;
pub use kubectl::Kubectl;
pub use terraform::Terraform;
