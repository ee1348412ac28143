// Listing description generation.
// Implements: prompt building, SEO scoring, description caching, the generation loop.
// All completion calls go through llm_client, never straight to a provider.

pub mod cache;
pub mod generator;
pub mod prompts;
pub mod seo_scoring;
