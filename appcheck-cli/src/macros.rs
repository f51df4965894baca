#[macro_export]
macro_rules! runnable_cmd {
    ($name: expr) => {
        Box::new($name) as Box<dyn $crate::Runnable>
    };
}

/// `anyhow` context closure for a failed file operation on `$path`.
#[macro_export]
macro_rules! path_context {
    ($action: literal, $path: expr) => {
        || format!(concat!("could not ", $action, " '{}'"), $path.display())
    };
}
