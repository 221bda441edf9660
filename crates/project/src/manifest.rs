//! AndroidManifest.xml Reader
//!
//! Extracts the application package and the launchable main activity from a
//! manifest. Attribute keys are matched on their local name, ignoring the
//! `android:` namespace prefix.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ProjectError;

/// Intent action that marks the entry-point activity.
const ACTION_MAIN: &str = "android.intent.action.MAIN";

/// Read the manifest at `path` and return the `package/Activity` component
/// identifier of the activity carrying an intent-filter with the MAIN
/// action, suitable for `am start -n`.
pub async fn main_activity(path: impl AsRef<Path>) -> Result<String, ProjectError> {
    let contents = tokio::fs::read_to_string(path.as_ref()).await?;
    main_activity_from_str(&contents)
}

/// Parse manifest contents and return the MAIN activity component.
pub fn main_activity_from_str(xml: &str) -> Result<String, ProjectError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut package = String::new();
    let mut current_activity: Option<String> = None;
    let mut in_intent_filter = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"manifest" => {
                    package = local_attr(e, "package").unwrap_or_default();
                }
                b"activity" | b"activity-alias" => {
                    current_activity = local_attr(e, "name");
                }
                b"intent-filter" => {
                    in_intent_filter = true;
                }
                b"action" if in_intent_filter => {
                    if local_attr(e, "name").as_deref() == Some(ACTION_MAIN) {
                        if let Some(activity) = &current_activity {
                            return Ok(format!("{}/{}", package, activity));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"activity" | b"activity-alias" => {
                    current_activity = None;
                }
                b"intent-filter" => {
                    in_intent_filter = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ProjectError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Err(ProjectError::NoMainActivity)
}

/// Get an attribute value without regard to namespace.
fn local_attr(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().filter_map(|a| a.ok()) {
        let key = std::str::from_utf8(attr.key.as_ref()).ok()?;
        let local = key.rsplit(':').next().unwrap_or(key);
        if local == name {
            return std::str::from_utf8(&attr.value).ok().map(|s| s.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.app"
    android:versionCode="1">

    <application android:label="@string/app_name">
        <activity android:name=".SettingsActivity"/>
        <activity android:name=".MainActivity" android:exported="true">
            <intent-filter>
                <action android:name="android.intent.action.MAIN"/>
                <category android:name="android.intent.category.LAUNCHER"/>
            </intent-filter>
        </activity>
    </application>
</manifest>"#;

    #[test]
    fn test_main_activity() {
        let component = main_activity_from_str(SAMPLE_MANIFEST).unwrap();
        assert_eq!(component, "com.example.app/.MainActivity");
    }

    #[test]
    fn test_no_main_activity() {
        let xml = r#"<manifest package="com.example.app">
            <application>
                <activity android:name=".SettingsActivity"/>
            </application>
        </manifest>"#;
        let err = main_activity_from_str(xml).unwrap_err();
        assert!(matches!(err, ProjectError::NoMainActivity));
    }

    #[test]
    fn test_action_outside_intent_filter_is_ignored() {
        let xml = r#"<manifest package="com.example.app">
            <application>
                <activity android:name=".Fake">
                    <action android:name="android.intent.action.MAIN"/>
                </activity>
            </application>
        </manifest>"#;
        assert!(main_activity_from_str(xml).is_err());
    }
}
