use tracing::warn;

use crate::db::store::DocumentStore;
use crate::models::{DocRef, Document, Visibility, WsError};

/// Decide whether `identity` may join the room of the referenced document.
///
/// Returns the resolved document on success so the caller can derive the
/// canonical room key (the numeric id) from whichever addressing form the
/// client used.
///
/// Rules:
/// - an expired or unknown reference is NotFound, regardless of form
/// - share-id addressing needs no credential: holding the share id is the
///   authorization ("magic link")
/// - numeric-id addressing of a private document requires a credential
///   matching the owner
/// - numeric-id addressing of a public document needs no credential
pub async fn can_join(
    store: &dyn DocumentStore,
    doc_ref: &DocRef,
    identity: Option<i64>,
) -> Result<Document, WsError> {
    let document = store.get(doc_ref).await?.ok_or(WsError::NotFound)?;

    match doc_ref {
        DocRef::Share(_) => Ok(document),
        DocRef::Id(_) => match document.visibility {
            Visibility::Public => Ok(document),
            Visibility::Private => {
                if document.owner_id.is_some() && identity == document.owner_id {
                    Ok(document)
                } else {
                    warn!(
                        document_id = document.id,
                        "Join attempt on private document denied"
                    );
                    Err(WsError::AccessDenied)
                }
            }
        },
    }
}

/// Decide whether `identity` may edit the referenced document.
///
/// Edit rights follow join rights: a public document's content is editable
/// by any holder of its share id, a private one only by its owner.
pub async fn can_edit(
    store: &dyn DocumentStore,
    doc_ref: &DocRef,
    identity: Option<i64>,
) -> Result<Document, WsError> {
    can_join(store, doc_ref, identity).await
}
