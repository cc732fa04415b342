pub mod context_aware;
pub mod resource_allocation;
