use detector::ClassSummary;

/// Upload form, served at `/`. Styling follows the original demo card
/// layout (orange accent, centered card).
pub const INDEX: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Blood Cell Detection</title>
<style>
  body { font-family: sans-serif; background: linear-gradient(to right, #f7f7f7, #ffffff); margin: 0; }
  .card { max-width: 640px; margin: 48px auto; padding: 30px; border-radius: 10px;
          background: #fff; box-shadow: 0 4px 10px rgba(0, 0, 0, 0.1); }
  h1 { text-align: center; font-size: 28px; color: #FF5733; margin-bottom: 10px; }
  p { color: #444; }
  input[type=file] { border: 2px solid #FF5733; border-radius: 8px; padding: 8px; width: 100%; box-sizing: border-box; }
  button { background: #FF5733; color: #fff; font-size: 16px; font-weight: bold;
           border: none; border-radius: 8px; padding: 10px 24px; margin-top: 16px; cursor: pointer; }
  button:hover { background: #E74C3C; }
</style>
</head>
<body>
<div class="card">
  <h1>Blood Cell Detection</h1>
  <p>Upload an image to detect <strong>RBC, WBC and Platelets</strong>.
     The result shows the annotated image and per-class detection counts
     with mean confidence.</p>
  <form action="/predict" method="post" enctype="multipart/form-data">
    <input type="file" name="image" accept="image/*" required>
    <button type="submit">Detect</button>
  </form>
</div>
</body>
</html>
"#;

/// Result page: annotated image as a data URI next to the summary table,
/// one row per vocabulary class.
pub fn result_page(summary: &[ClassSummary], image_base64: &str) -> String {
    let mut rows = String::new();
    for row in summary {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.3}</td></tr>\n",
            escape(&row.class_name),
            row.detections,
            row.mean_confidence,
        ));
    }

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Blood Cell Detection - Result</title>
<style>
  body {{ font-family: sans-serif; background: linear-gradient(to right, #f7f7f7, #ffffff); margin: 0; }}
  .card {{ max-width: 900px; margin: 48px auto; padding: 30px; border-radius: 10px;
           background: #fff; box-shadow: 0 4px 10px rgba(0, 0, 0, 0.1); }}
  h1 {{ text-align: center; font-size: 28px; color: #FF5733; }}
  .result {{ display: flex; gap: 24px; flex-wrap: wrap; align-items: flex-start; }}
  img {{ max-width: 560px; width: 100%; border: 2px solid #ddd; border-radius: 10px; padding: 5px; }}
  table {{ border-collapse: collapse; font-size: 15px; }}
  th, td {{ border: 1px solid #ddd; padding: 8px 16px; text-align: left; }}
  th {{ background: #FF5733; color: #fff; }}
  a {{ color: #FF5733; }}
</style>
</head>
<body>
<div class="card">
  <h1>Detection Result</h1>
  <div class="result">
    <img src="data:image/jpeg;base64,{image_base64}" alt="annotated image">
    <table>
      <thead><tr><th>Class</th><th>Detections</th><th>Mean confidence</th></tr></thead>
      <tbody>
{rows}      </tbody>
    </table>
  </div>
  <p><a href="/">Detect another image</a></p>
</div>
</body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
