use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use crate::sneakers::repo::{self, NewSneaker, Sneaker};
use crate::state::AppState;
use crate::storage::ext_from_mime;

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

/// Upload the listing images to object storage, then create the sneaker and
/// link the image rows in one transaction.
pub async fn create_with_images(
    st: &AppState,
    new: &NewSneaker<'_>,
    images: Vec<UploadItem>,
) -> anyhow::Result<(Sneaker, Vec<Uuid>)> {
    struct Obj {
        id: Uuid,
        key: String,
    }
    let mut objs = Vec::with_capacity(images.len());
    for img in images {
        let id = Uuid::new_v4();
        let ext = ext_from_mime(&img.content_type).unwrap_or("bin");
        let key = format!("sneakers/{}/{}.{}", new.seller_id, id, ext);
        st.storage
            .put_object(&key, img.body, &img.content_type)
            .await
            .with_context(|| format!("put_object {}", key))?;
        objs.push(Obj { id, key });
    }

    let mut tx = st.db.begin().await.context("begin tx")?;
    let sneaker = repo::insert_tx(&mut tx, new).await?;
    for o in &objs {
        repo::insert_image_tx(&mut tx, o.id, sneaker.id, &o.key).await?;
    }
    tx.commit().await.context("commit tx")?;

    Ok((sneaker, objs.into_iter().map(|o| o.id).collect()))
}

const IMAGE_URL_TTL_SECS: u64 = 30 * 60;

pub async fn presign_many(st: &AppState, keys: Vec<String>) -> anyhow::Result<Vec<String>> {
    let mut out = Vec::with_capacity(keys.len());
    for k in keys {
        out.push(st.storage.presign_get(&k, IMAGE_URL_TTL_SECS).await?);
    }
    Ok(out)
}

/// Best-effort cleanup of stored objects when a listing is removed.
pub async fn delete_many(st: &AppState, keys: Vec<String>) {
    for k in keys {
        if let Err(e) = st.storage.delete_object(&k).await {
            tracing::warn!(error = %e, key = %k, "delete listing image failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::state::AppState;

    #[tokio::test]
    async fn presign_many_uses_storage_client() {
        let state = AppState::fake();
        let urls = super::presign_many(&state, vec!["a/b/c.jpg".into(), "x/y/z.png".into()])
            .await
            .unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].contains("a/b/c.jpg"));
        assert!(urls[1].contains("x/y/z.png"));
    }

    #[tokio::test]
    async fn delete_many_never_panics() {
        let state = AppState::fake();
        super::delete_many(&state, vec!["a/b/c.jpg".into()]).await;
    }
}
