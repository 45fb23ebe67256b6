use std::path::Path;

/// Canonical type identifiers for well-known extensions
///
/// Aliases share an identifier so that `photo.jpg` and `photo.jpeg` classify
/// the same way.
const KNOWN_TYPES: &[(&[&str], &str)] = &[
    (&["txt", "text"], "public.plain-text"),
    (&["md", "markdown"], "net.daringfireball.markdown"),
    (&["htm", "html"], "public.html"),
    (&["xml"], "public.xml"),
    (&["json"], "public.json"),
    (&["yml", "yaml"], "public.yaml"),
    (&["csv"], "public.comma-separated-values-text"),
    (&["rtf"], "public.rtf"),
    (&["pdf"], "com.adobe.pdf"),
    (&["png"], "public.png"),
    (&["jpg", "jpeg", "jpe"], "public.jpeg"),
    (&["gif"], "com.compuserve.gif"),
    (&["tif", "tiff"], "public.tiff"),
    (&["bmp"], "com.microsoft.bmp"),
    (&["heic"], "public.heic"),
    (&["mp3"], "public.mp3"),
    (&["wav"], "com.microsoft.waveform-audio"),
    (&["mp4"], "public.mpeg-4"),
    (&["mov", "qt"], "com.apple.quicktime-movie"),
    (&["zip"], "public.zip-archive"),
    (&["tar"], "public.tar-archive"),
    (&["gz", "gzip"], "org.gnu.gnu-zip-archive"),
    (&["c", "h"], "public.c-source"),
    (&["rs"], "public.rust-source"),
    (&["py"], "public.python-script"),
    (&["sh"], "public.shell-script"),
    (&["swift"], "public.swift-source"),
];

/// Classify a file by its name
///
/// Unknown extensions get a dynamic `dyn.<ext>` identifier; names without an
/// extension have no determinable type.
pub fn type_identifier_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if ext.is_empty() {
        return None;
    }

    let known = KNOWN_TYPES
        .iter()
        .find(|(extensions, _)| extensions.contains(&ext.as_str()))
        .map(|(_, identifier)| identifier.to_string());

    Some(known.unwrap_or_else(|| format!("dyn.{}", ext)))
}
