// Prompt text for listing description generation.

use crate::models::listing::ListingRow;

/// Builds the copywriting instruction for a listing. Fields are embedded verbatim.
pub fn build_description_prompt(listing: &ListingRow) -> String {
    format!(
        "You are an expert real estate copywriter.
Write a professional, SEO-optimized, and engaging property description.

Details:
- Title: {title}
- Type: {property_type}
- Location: {location}
- Price: {price}
- Key Features: {key_features}
- Tone: {tone}",
        title = listing.title,
        property_type = listing.property_type,
        location = listing.location,
        price = listing.price,
        key_features = listing.key_features,
        tone = listing.tone,
    )
}
