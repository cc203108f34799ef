//! Marshalling [`Filters`] into hub query strings.

use quill_core::{Filters, Hash};

use crate::error::FederationError;

/// Encode `filters` as a query string (without the leading `?`).
///
/// Multi-valued filters repeat their key. `federated` is never sent: the
/// loaders translate it into an `iri` restriction first.
///
/// # Errors
///
/// Returns [`FederationError::Validation`] if a value cannot be encoded.
pub fn encode(filters: &Filters) -> Result<String, FederationError> {
    let mut pairs: Vec<(&'static str, String)> = Vec::new();
    let items = &filters.items;
    let accounts = &filters.accounts;
    let votes = &filters.votes;

    push(&mut pairs, "type", filters.types.iter().cloned());

    push(&mut pairs, "hash", hashes(&items.key));
    push(&mut pairs, "mediaType", items.media_type.iter().map(|m| m.as_str().to_string()));
    push(&mut pairs, "attributedTo", hashes(&items.attributed_to));
    push(&mut pairs, "inReplyTo", items.in_reply_to.iter().cloned());
    push(&mut pairs, "context", items.context.iter().cloned());
    push(&mut pairs, "deleted", items.deleted.iter().map(bool::to_string));
    push(&mut pairs, "followedBy", items.followed_by.iter().cloned());
    push(&mut pairs, "iri", items.iri.iter().cloned());

    push(&mut pairs, "hash", hashes(&accounts.key));
    push(&mut pairs, "handle", accounts.handle.iter().cloned());
    push(&mut pairs, "deleted", accounts.deleted.iter().map(bool::to_string));

    push(&mut pairs, "attributedTo", hashes(&votes.attributed_to));
    push(&mut pairs, "object", hashes(&votes.item_key));

    push(&mut pairs, "maxItems", filters.max_items.iter().map(u32::to_string));
    push(&mut pairs, "page", filters.page.iter().map(u32::to_string));

    serde_urlencoded::to_string(&pairs)
        .map_err(|e| FederationError::Validation(format!("unable to encode filters: {e}")))
}

fn push(
    pairs: &mut Vec<(&'static str, String)>,
    key: &'static str,
    values: impl IntoIterator<Item = String>,
) {
    pairs.extend(values.into_iter().map(|v| (key, v)));
}

fn hashes(hashes: &[Hash]) -> impl Iterator<Item = String> + '_ {
    hashes.iter().map(|h| h.as_str().to_string())
}

/// Append the encoded `filters` to `base`.
///
/// # Errors
///
/// Returns [`FederationError::Validation`] if a value cannot be encoded.
pub fn with_query(base: &str, filters: &Filters) -> Result<String, FederationError> {
    let query = encode(filters)?;
    if query.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}?{query}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_core::{LoadItemsFilter, LoadVotesFilter, MimeType};

    #[test]
    fn empty_filters_add_nothing() {
        assert_eq!(
            with_query("https://hub.example/objects", &Filters::default()).unwrap(),
            "https://hub.example/objects"
        );
    }

    #[test]
    fn multi_valued_filters_repeat_keys() {
        let filters = Filters {
            types: vec!["Like".into(), "Dislike".into()],
            votes: LoadVotesFilter {
                item_key: vec![Hash::from("h1"), Hash::from("h2")],
                ..LoadVotesFilter::default()
            },
            ..Filters::default()
        };
        assert_eq!(
            encode(&filters).unwrap(),
            "type=Like&type=Dislike&object=h1&object=h2"
        );
    }

    #[test]
    fn item_filters_are_camel_cased_and_escaped() {
        let filters = Filters {
            items: LoadItemsFilter {
                media_type: vec![MimeType::Markdown],
                in_reply_to: vec!["https://hub.example/objects/p 1".into()],
                deleted: vec![false],
                federated: vec![false],
                ..LoadItemsFilter::default()
            },
            max_items: Some(25),
            page: Some(2),
            ..Filters::default()
        };
        assert_eq!(
            encode(&filters).unwrap(),
            "mediaType=text%2Fmarkdown&inReplyTo=https%3A%2F%2Fhub.example%2Fobjects%2Fp+1&deleted=false&maxItems=25&page=2"
        );
    }

    #[test]
    fn account_filters_use_hash_and_handle() {
        let filters = Filters::accounts_by_handle("alice");
        assert_eq!(encode(&filters).unwrap(), "handle=alice");
        let filters = Filters::accounts_by_key([Hash::from("a11ce000")]);
        assert_eq!(encode(&filters).unwrap(), "hash=a11ce000");
    }
}
