use crate::config::MAX_POSTS;
use crate::error::LookupError;
use crate::models::{ExtractedFields, ProfileResult};
use crate::normalize::normalize_count;

/// Strip surrounding whitespace and one leading `@`.
///
/// Fails with [`LookupError::InvalidUsername`] when nothing is left.
pub fn normalize_username(raw: &str) -> Result<String, LookupError> {
    let trimmed = raw.trim();
    let clean = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    if clean.is_empty() {
        return Err(LookupError::InvalidUsername);
    }
    Ok(clean.to_string())
}

/// Apply the acceptance rules to a validated page.
///
/// A page without a name is treated as missing or private; a page whose
/// every post was filtered out has no usable content. Otherwise the first
/// `max_posts` posts (never more than [`MAX_POSTS`]) are kept and counts
/// are normalized.
pub fn assemble_profile(
    username: String,
    fields: ExtractedFields,
    max_posts: usize,
) -> Result<ProfileResult, LookupError> {
    if fields.name.is_empty() {
        return Err(LookupError::NotFound);
    }
    if fields.posts.is_empty() {
        return Err(LookupError::EmptyContent);
    }

    let mut posts = fields.posts;
    posts.truncate(max_posts.min(MAX_POSTS));

    Ok(ProfileResult {
        username,
        name: fields.name,
        bio: fields.bio,
        posts,
        followers: normalize_count(&fields.followers_text),
        following: normalize_count(&fields.following_text),
    })
}
