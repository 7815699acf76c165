use crate::pipeline::PageImages;

const HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Lithocolor</title>
<style>
  body { font-family: sans-serif; max-width: 1100px; margin: 2em auto; color: #262626; }
  form { display: flex; gap: 0.75em; align-items: center; flex-wrap: wrap; }
  .results { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 1.5em; margin-top: 2em; }
  figure { margin: 0; }
  figure img { width: 100%; border: 1px solid #ddd; }
  .stats { color: #666; font-size: 0.9em; }
</style>
</head>
<body>
<h1>Lithocolor</h1>
<p>Upload a photo to derive a normalized height map for lithophane relief.</p>
<form method="post" action="/generate" enctype="multipart/form-data">
  <input type="file" name="image" accept="image/*" required>
  <button type="submit">Generate</button>
  <button type="submit" formaction="/download/heightmap">Download height map</button>
  <button type="submit" formaction="/download/histogram">Download histogram</button>
</form>
"#;

const TAIL: &str = "</body>\n</html>\n";

/// Renders the upload form, followed by the results of a previous upload when present.
pub fn render(images: Option<&PageImages>) -> String {
    let mut html = String::from(HEAD);
    if let Some(images) = images {
        html.push_str(&results(images));
    }
    html.push_str(TAIL);
    html
}

fn results(images: &PageImages) -> String {
    let stats = &images.stats;
    let range = if stats.is_uniform() {
        "uniform image, height map is flat".to_string()
    } else {
        format!("raw range {}&ndash;{} stretched to 0&ndash;255", stats.raw_min, stats.raw_max)
    };
    let mode = images
        .mode
        .map(|m| format!(", most frequent value {m}"))
        .unwrap_or_default();

    format!(
        r#"<p class="stats">{width}&times;{height} px, {range}{mode}</p>
<div class="results">
  <figure><img src="{original}" alt="Original image"><figcaption>Original</figcaption></figure>
  <figure><img src="{heightmap}" alt="Height map"><figcaption>Height map</figcaption></figure>
  <figure><img src="{histogram}" alt="Height map histogram"><figcaption>Histogram</figcaption></figure>
</div>
"#,
        width = stats.width,
        height = stats.height,
        original = images.original,
        heightmap = images.heightmap,
        histogram = images.histogram,
    )
}
