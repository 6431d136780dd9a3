//! Ruby source detection by filename and shebang

use std::path::Path;

/// Extensions of Ruby files (lowercase)
const EXTENSIONS: &[&str] = &[
    "rb", "ruby", "rbw", "rake", "gemspec", "podspec", "ru", "prawn", "arb",
];

/// Extensionless files that are Ruby by convention
const FILENAMES: &[&str] = &[
    "Rakefile", "Guardfile", "Gemfile", "Capfile", "Podfile", "Vagrantfile", "Berksfile",
    "Dangerfile", "Fastfile", "Deliverfile", "Appfile",
];

/// Whether the first line is a shebang running `ruby`
///
/// Accepts `#!/usr/bin/ruby`, `#!/usr/bin/env ruby`, `#!/opt/ruby3.2/bin/ruby -w`.
pub fn is_ruby_shebang(text: &[u8]) -> bool {
    let first_line = text.split(|b| *b == b'\n').next().unwrap_or_default();
    let Some(command) = first_line.strip_prefix(b"#!") else {
        return false;
    };
    command
        .split(|b| b.is_ascii_whitespace() || *b == b'/')
        .any(|part| part.starts_with(b"ruby"))
}

/// Whether `path` names a Ruby file
pub fn matches_filename(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    if FILENAMES.contains(&name) {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| EXTENSIONS.contains(&ext.as_str()))
}

/// Detect Ruby from an optional filename, falling back to the shebang
pub fn detect(path: Option<&Path>, text: &[u8]) -> bool {
    path.is_some_and(matches_filename) || is_ruby_shebang(text)
}
