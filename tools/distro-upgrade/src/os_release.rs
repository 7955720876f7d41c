use std::{fs, io, path::Path};

pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Pull `VERSION_ID` out of an os-release file, e.g. `VERSION_ID="15.4"`
pub fn parse_version_id(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let value = line.trim().strip_prefix("VERSION_ID=")?;
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');

        (!value.is_empty()).then(|| value.to_string())
    })
}

pub fn read_version_id(path: &Path) -> io::Result<Option<String>> {
    Ok(parse_version_id(&fs::read_to_string(path)?))
}
