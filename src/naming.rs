use crate::catalog::ShowId;

/// True when the scheme can produce a unique filename per show
///
/// At least one of `%T`, `%t` or `%i` must appear.
pub fn scheme_is_unique(scheme: &str) -> bool {
    scheme.contains("%T") || scheme.contains("%t") || scheme.contains("%i")
}

/// Expand a naming scheme for one show
///
/// `%T` is the title as stored, `%t` the lowercased title, `%i` the show id
/// and `%%` a literal percent sign. Path separators in the result are
/// replaced so one feed cannot escape the target directory.
pub fn filename_for(scheme: &str, title: &str, id: ShowId) -> String {
    // List of tuples to ensure the %% escape is expanded last
    let replacements = [
        ("%T", title.to_string()),
        ("%t", title.to_lowercase()),
        ("%i", id.to_string()),
        ("%%", "%".to_string()),
    ];

    let mut filename = scheme.to_string();
    for (search, replace) in &replacements {
        filename = filename.replace(search, replace);
    }

    if filename.contains('/') || filename.contains('\\') {
        filename = filename.replace('/', "_").replace('\\', "_");
    }

    sanitize_filename::sanitize(&filename)
}
