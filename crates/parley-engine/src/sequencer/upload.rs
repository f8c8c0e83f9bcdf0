use crate::page::{Page, ancestor};
use parley_common::error::DomError;
use parley_common::protocol::ElementHandle;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const FILE_INPUT_SELECTOR: &str = r#"input[type="file"]"#;

/// Find the file input belonging to the reply box. File inputs are hidden
/// behind a camera icon, so visibility is not required.
pub async fn locate_file_input<P: Page + ?Sized>(
    page: &P,
    anchor: Option<ElementHandle>,
    ancestor_levels: usize,
) -> Result<Option<ElementHandle>, DomError> {
    if let Some(anchor) = anchor {
        let scope = match ancestor(page, anchor, ancestor_levels).await {
            Ok(scope) => Some(scope),
            Err(e) if e.is_stale() => None,
            Err(e) => return Err(e),
        };
        if let Some(scope) = scope
            && let Some(el) = page
                .query_all(Some(scope), FILE_INPUT_SELECTOR)
                .await?
                .into_iter()
                .next()
        {
            return Ok(Some(el));
        }
    }

    Ok(page
        .query_all(None, FILE_INPUT_SELECTOR)
        .await?
        .into_iter()
        .last())
}

/// Attach images near `anchor` (the comment input, or the container when
/// there is none). Returns the file input used, if any.
pub async fn attach_images<P: Page + ?Sized>(
    page: &mut P,
    anchor: Option<ElementHandle>,
    images: &[PathBuf],
    ancestor_levels: usize,
) -> Result<Option<ElementHandle>, DomError> {
    if images.is_empty() {
        debug!("Image step enabled but the job carries no images");
        return Ok(None);
    }

    let Some(file_input) = locate_file_input(&*page, anchor, ancestor_levels).await? else {
        warn!("File input not found, skipping {} image(s)", images.len());
        return Ok(None);
    };

    info!("Attaching {} image(s) to {}", images.len(), file_input);
    page.set_input_files(file_input, images).await?;
    Ok(Some(file_input))
}
