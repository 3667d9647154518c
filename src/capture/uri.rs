//! Advanced URI targets for handing a composed note to Obsidian.

use urlencoding::encode;

const URI_BASE: &str = "obsidian://advanced-uri?";

/// Everything the write protocol needs for one capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub vault: String,
    /// Folder relative to the vault root. Empty means the root.
    pub folder: String,
    pub file_name: String,
    pub body: String,
    pub append: bool,
    pub open_in_new_tab: bool,
}

impl WriteRequest {
    fn filepath(&self) -> String {
        let folder = self.folder.trim_matches('/');
        if folder.is_empty() {
            encode(&self.file_name).into_owned()
        } else {
            format!("{}/{}", encode(folder), encode(&self.file_name))
        }
    }

    fn common_params(&self) -> String {
        format!(
            "vault={}&filepath={}&data={}",
            encode(&self.vault),
            self.filepath(),
            encode(&self.body)
        )
    }
}

/// Target for the first write attempt.
///
/// Existing notes are appended to silently; new notes open in a tab only when
/// the user prefers it.
pub fn primary_target(req: &WriteRequest) -> String {
    let mut target = String::from(URI_BASE);
    if req.append {
        target.push_str("mode=append&");
    }
    target.push_str(&req.common_params());
    if req.append {
        target.push_str("&openmode=silent");
    } else if req.open_in_new_tab {
        target.push_str("&openmode=tab");
    }
    target
}

/// Target for the retry after a failed primary write. Never appends.
pub fn fallback_target(req: &WriteRequest) -> String {
    let mut target = String::from(URI_BASE);
    target.push_str(&req.common_params());
    if req.open_in_new_tab {
        target.push_str("&openmode=tab");
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(append: bool, open_in_new_tab: bool) -> WriteRequest {
        WriteRequest {
            vault: "My Vault".to_string(),
            folder: "inbox".to_string(),
            file_name: "Draft".to_string(),
            body: "## hi\n\nthere".to_string(),
            append,
            open_in_new_tab,
        }
    }

    #[test]
    fn create_without_new_tab() {
        assert_eq!(
            primary_target(&request(false, false)),
            "obsidian://advanced-uri?vault=My%20Vault&filepath=inbox/Draft&data=%23%23%20hi%0A%0Athere"
        );
    }

    #[test]
    fn create_with_new_tab() {
        assert!(primary_target(&request(false, true)).ends_with("&openmode=tab"));
    }

    #[test]
    fn append_is_silent_regardless_of_preference() {
        let target = primary_target(&request(true, true));
        assert!(target.starts_with("obsidian://advanced-uri?mode=append&vault="));
        assert!(target.ends_with("&openmode=silent"));
        assert!(!target.contains("openmode=tab"));
    }

    #[test]
    fn fallback_drops_append_awareness() {
        let target = fallback_target(&request(true, false));
        assert!(!target.contains("mode=append"));
        assert!(!target.contains("openmode"));

        assert!(fallback_target(&request(true, true)).ends_with("&openmode=tab"));
    }

    #[test]
    fn root_folder_has_no_separator() {
        let mut req = request(false, false);
        req.folder = String::new();
        req.file_name = "A&B".to_string();
        assert!(primary_target(&req).contains("&filepath=A%26B&data="));
    }

    #[test]
    fn nested_folder_is_encoded_as_one_component() {
        let mut req = request(false, false);
        req.folder = "projects/2024".to_string();
        assert!(primary_target(&req).contains("&filepath=projects%2F2024/Draft&"));
    }
}
