use std::{path::PathBuf, sync::LazyLock};

pub static DEFAULT_WB_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Some(dir) = std::env::var_os("WINE_BUILDS_HOME") {
        return PathBuf::from(dir);
    }

    let mut path = dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_default();
    path.push("wine-builds");
    path
});

/// Computes a path inside the wine-builds directory.
///
/// Returns a `&Path` referencing the directory itself if no arguments are passed in, or a
/// `PathBuf` created by joining all of the arguments to the base directory if at least
/// one argument is passed in.
///
/// # Examples
///
/// ```
/// use wine_builds::wb_path;
///
/// let base = wb_path!().to_path_buf();
/// assert_eq!(wb_path!("logs", "a.log"), base.join("logs").join("a.log"));
/// ```
#[macro_export]
macro_rules! wb_path {
    () => {
        $crate::paths::DEFAULT_WB_PATH.as_path()
    };

    ( $( $path:expr ),+ $(,)? ) => {
        [
            $crate::paths::DEFAULT_WB_PATH.as_path(),
            $( std::path::Path::new(&$path) ),+
        ].into_iter().collect::<std::path::PathBuf>()
    };
}
