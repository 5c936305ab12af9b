use axum::response::Html;

/// Browser front-end for `/signup` and `/batch-signup`.
pub(crate) async fn signup_form() -> Html<&'static str> {
    Html(SIGNUP_FORM)
}

const SIGNUP_FORM: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Mnet Signup Bot</title>
  <style>
    body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
    fieldset { margin-bottom: 1.5rem; }
    label { display: block; margin: 0.4rem 0; }
    pre { background: #f4f4f4; padding: 0.75rem; white-space: pre-wrap; }
  </style>
</head>
<body>
  <h1>Mnet Signup Bot</h1>

  <form id="single">
    <fieldset>
      <legend>Single signup</legend>
      <label>Email <input type="email" name="email" required></label>
      <label>Password <input type="password" name="password" required></label>
      <label>Gender
        <select name="gender">
          <option value="m">m</option>
          <option value="f">f</option>
        </select>
      </label>
      <label>Birth year <input type="text" name="birth_year" value="1998" pattern="[0-9]{4}"></label>
      <label>Device name <input type="text" name="device_name" placeholder="random when empty"></label>
      <label>Locale <input type="text" name="locale" value="en"></label>
      <label>Marketing terms version <input type="text" name="marketing_terms_version"></label>
      <button type="submit">Sign up</button>
    </fieldset>
  </form>

  <form id="batch">
    <fieldset>
      <legend>Batch signup (CSV)</legend>
      <label>File <input type="file" name="file" accept=".csv" required></label>
      <button type="submit">Upload</button>
    </fieldset>
  </form>

  <pre id="result"></pre>

  <script>
    const result = document.getElementById("result");

    async function show(response) {
      const text = await response.text();
      try {
        result.textContent = JSON.stringify(JSON.parse(text), null, 2);
      } catch (_) {
        result.textContent = text;
      }
    }

    document.getElementById("single").addEventListener("submit", async (event) => {
      event.preventDefault();
      const body = {};
      for (const [key, value] of new FormData(event.target).entries()) {
        if (value !== "") body[key] = value;
      }
      result.textContent = "Submitting...";
      await show(await fetch("/signup", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify(body),
      }));
    });

    document.getElementById("batch").addEventListener("submit", async (event) => {
      event.preventDefault();
      result.textContent = "Uploading...";
      await show(await fetch("/batch-signup", {
        method: "POST",
        body: new FormData(event.target),
      }));
    });
  </script>
</body>
</html>
"#;
