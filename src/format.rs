//! Status line formatting for `spotifyctl status`.
//!
//! Lengths are counted in characters, not bytes.

use crate::error::App;

pub const ARTIST_TOKEN: &str = "%artist%";
pub const TITLE_TOKEN: &str = "%title%";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// `None` means no limit.
    pub max_artist_len: Option<usize>,
    pub max_title_len: Option<usize>,
    pub max_len: Option<usize>,
    pub format: String,
    pub trunc: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_artist_len: None,
            max_title_len: None,
            max_len: None,
            format: format!("{ARTIST_TOKEN}: {TITLE_TOKEN}"),
            trunc: "...".to_string(),
        }
    }
}

/// Shortens `s` to at most `max_len` characters, ending it with `trunc` when
/// anything was cut. Fails if `trunc` alone does not fit in `max_len`.
pub fn str_trunc(s: &str, max_len: usize, trunc: &str) -> Result<String, App> {
    let trunc_len = trunc.chars().count();
    if trunc_len > max_len {
        return Err(App::Configuration(format!(
            "truncation string '{trunc}' is longer than the maximum length {max_len}"
        )));
    }
    if s.chars().count() <= max_len {
        return Ok(s.to_string());
    }
    let mut out: String = s.chars().take(max_len - trunc_len).collect();
    out.push_str(trunc);
    Ok(out)
}

fn trunc_to(s: &str, max_len: Option<usize>, trunc: &str, what: &str) -> Result<String, App> {
    match max_len {
        None => Ok(s.to_string()),
        Some(max_len) => str_trunc(s, max_len, trunc).map_err(|_| {
            App::Configuration(format!(
                "Failed to truncate {what}. Please make sure the trunc string is smaller than the max {what} length."
            ))
        }),
    }
}

/// Replaces every `%artist%` and `%title%` in one left-to-right pass, so
/// values are never expanded again.
pub fn substitute(template: &str, artist: &str, title: &str) -> String {
    let mut out = String::with_capacity(template.len() + artist.len() + title.len());
    let mut rest = template;
    while let Some(ch) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix(ARTIST_TOKEN) {
            out.push_str(artist);
            rest = after;
        } else if let Some(after) = rest.strip_prefix(TITLE_TOKEN) {
            out.push_str(title);
            rest = after;
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

/// Builds the status line. Artist and title are only cut to their own limits
/// when the full line would not fit in `max_len`, or when there is no
/// overall limit.
pub fn format_output(artist: &str, title: &str, options: &FormatOptions) -> Result<String, App> {
    let expanded = substitute(&options.format, artist, title);
    let fits = options
        .max_len
        .is_some_and(|max_len| expanded.chars().count() <= max_len);
    if fits {
        return Ok(expanded);
    }

    let artist = trunc_to(artist, options.max_artist_len, &options.trunc, "artist")?;
    let title = trunc_to(title, options.max_title_len, &options.trunc, "title")?;
    let output = substitute(&options.format, &artist, &title);
    trunc_to(&output, options.max_len, &options.trunc, "output")
}
