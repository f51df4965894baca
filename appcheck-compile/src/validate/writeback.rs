use std::{borrow::Cow, path::PathBuf};

use appcheck::script::Script;
use futures::future;
use log::info;
use tokio::fs;

use crate::error::Error;

/// Serializes `script` with a new body, in the layout of an exported script file.
pub fn render_script(script: &Script, body: &str) -> String {
    format!(
        "\n<script key=\"{}\" type=\"{}\" name=\"{}\"><![CDATA[{}]]></script>",
        escape_attribute(&script.key),
        escape_attribute(&script.script_type),
        escape_attribute(&script.name),
        // a literal `]]>` must span two sections
        body.replace("]]>", "]]]]><![CDATA[>")
    )
}

fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            ch => escaped.push(ch),
        }
    }

    Cow::Owned(escaped)
}

/// Overwrites every file concurrently, one task per file.
///
/// Files are replaced in place, an interrupted write can leave a file truncated.
pub async fn write_back(writes: Vec<(PathBuf, String)>) -> Result<Vec<PathBuf>, Error> {
    let tasks = writes.into_iter().map(|(path, contents)| {
        tokio::spawn(async move {
            fs::write(&path, contents)
                .await
                .map_err(Error::io(path.clone()))?;
            info!("wrote fixes to '{}'", path.display());
            Ok::<_, Error>(path)
        })
    });

    future::try_join_all(tasks).await?.into_iter().collect()
}

#[cfg(test)]
mod test {
    use std::{fs as std_fs, path::Path};

    use appcheck::{tests_cfg::UTIL_SCRIPT_XML, xml::parse_record};

    use super::*;

    fn util() -> Script {
        Script::from_record(
            &parse_record(UTIL_SCRIPT_XML).unwrap(),
            Path::new("scripts/Util.xml"),
        )
        .unwrap()
    }

    #[test]
    fn unchanged_body_renders_original_file() {
        let util = util();
        assert_eq!(render_script(&util, &util.body), UTIL_SCRIPT_XML);
    }

    #[test]
    fn attributes_are_escaped() {
        let mut script = util();
        script.name = "Tom & \"Jerry\" <3>".to_string();

        assert_eq!(
            render_script(&script, "x;"),
            "\n<script key=\"script-util\" type=\"text/javascript\" name=\"Tom &amp; &quot;Jerry&quot; &lt;3&gt;\"><![CDATA[x;]]></script>"
        );
    }

    #[test]
    fn rendered_script_parses_back() {
        let mut script = util();
        script.name = "a & b".to_string();
        let body = "if (a[b[0]]>1) { return \"]]>\"; }";

        let record = parse_record(&render_script(&script, body)).unwrap();
        let parsed = Script::from_record(&record, Path::new("scripts/Util.xml")).unwrap();
        assert_eq!(parsed.name, "a & b");
        assert_eq!(parsed.body, body);
    }

    #[tokio::test]
    async fn writes_run_for_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("First.xml");
        let second = dir.path().join("Second.xml");
        std_fs::write(&first, "old").unwrap();

        let written = write_back(vec![
            (first.clone(), "one".to_string()),
            (second.clone(), "two".to_string()),
        ])
        .await
        .unwrap();

        assert_eq!(written, [first.clone(), second.clone()]);
        assert_eq!(std_fs::read_to_string(first).unwrap(), "one");
        assert_eq!(std_fs::read_to_string(second).unwrap(), "two");
    }

    #[tokio::test]
    async fn missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("Util.xml");

        let err = write_back(vec![(path, "x".to_string())]).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
