use std::io::Read;
use std::path::Path;

/// Reads raw bytes from `path`, or from stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<Vec<u8>, std::io::Error> {
    if path.as_os_str() == "-" {
        let mut data = Vec::new();
        std::io::stdin().read_to_end(&mut data)?;
        return Ok(data);
    }
    std::fs::read(path)
}

pub fn save_script(path: &Path, text: &str) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_read() {
        let dir = std::env::temp_dir().join(format!("sieve-io-{}", std::process::id()));
        let path = dir.join("nested").join("filters.sieve");
        save_script(&path, "keep;\n").unwrap();
        assert_eq!(read_input(&path).unwrap(), b"keep;\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
