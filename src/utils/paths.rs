use std::path::{Path, PathBuf};

pub fn get_tmp_output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut tmp = path.as_ref().as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
