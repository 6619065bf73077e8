use crate::core::Library;

/// 取指定版本的文件清单；版本不存在（或记录无 assets）返回 None
pub fn extract_version_files<'a>(record: &'a Library, version: &str) -> Option<&'a [String]> {
    record
        .assets
        .as_deref()?
        .iter()
        .find(|a| a.version == version)
        .map(|a| a.files.as_slice())
}
