//! Browser front end served at `/`.
//!
//! Kept as a `&'static str` so the binary needs no asset directory. All state
//! lives server-side; the page only renders `/api/view` and posts actions.

pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>RadMap</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"></script>
  <style>
    body { max-width: 760px; margin: 0 auto; padding: 12px; font-family: sans-serif; }
    #map { height: 350px; border-radius: 12px; }
    button, .download { display: block; width: 100%; height: 55px; margin: 8px 0; font-weight: bold;
      border-radius: 12px; border: 1px solid #99a; background: #f4f6ff; cursor: pointer;
      text-align: center; line-height: 55px; text-decoration: none; color: inherit; box-sizing: border-box; }
    #undo { background: #fff3e0; color: #e65100; border-color: #ffb74d; height: 45px; line-height: 45px; }
    .download { background: #e8f5e9; color: #2e7d32; border-color: #a5d6a7; }
    form { border: 2px solid #3366ff; padding: 15px; border-radius: 15px; background: #f8f9fa; margin-top: 12px; }
    label { display: block; margin: 8px 0 4px; }
    input, select { width: 100%; padding: 6px; box-sizing: border-box; }
    #status { min-height: 1.2em; color: #555; }
    .dose-marker { display: flex; align-items: center; width: 220px; }
    .dose-label { margin-left: 4px; color: blue; font-size: 10pt; font-weight: bold;
      text-shadow: 1px 1px 2px white; white-space: nowrap; }
    [hidden] { display: none !important; }
  </style>
</head>
<body>
  <h1>&#9762; RadMap</h1>
  <details>
    <summary>How to use</summary>
    <ol>
      <li>Tap the map; the location and time are filled in for you.</li>
      <li>Enter the reading in <b>Dose rate</b>.</li>
      <li>Press <b>Save measurement</b>.</li>
    </ol>
  </details>
  <div id="map"></div>
  <form id="capture">
    <div>&#128205; <b>Point:</b> <code id="point"></code></div>
    <label for="value">Dose rate</label>
    <input id="value" type="number" step="0.01" value="0.00" />
    <label for="unit">Unit</label>
    <select id="unit"></select>
    <label for="time">Time</label>
    <input id="time" type="text" />
    <button type="submit">&#9989; Save measurement</button>
  </form>
  <button id="undo" hidden>&#11013; Remove last point</button>
  <p id="status"></p>
  <h2>Reports</h2>
  <a id="report" class="download" href="/export/map" hidden>&#127760; Save map as HTML</a>
  <a class="download" href="/export/csv">&#128190; Download CSV</a>
  <details>
    <summary>Manage data</summary>
    <label for="upload">Replace table from CSV</label>
    <input id="upload" type="file" accept=".csv,text/csv" />
    <button id="replace">&#128260; Replace</button>
    <button id="clear">&#128465; Clear everything</button>
  </details>
  <script>
    const map = L.map("map");
    L.tileLayer("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", {
      maxZoom: 19,
      attribution: "&copy; OpenStreetMap contributors"
    }).addTo(map);
    const layer = L.layerGroup().addTo(map);
    let centered = false;
    let timeEdited = false;

    function markerIcon(text) {
      const wrapper = document.createElement("div");
      wrapper.className = "dose-marker";
      const img = document.createElement("img");
      img.src = "/static/marker.svg";
      img.width = 35;
      img.height = 45;
      const label = document.createElement("div");
      label.className = "dose-label";
      label.textContent = text;
      wrapper.append(img, label);
      return L.divIcon({ html: wrapper, className: "", iconAnchor: [17, 45] });
    }

    function say(text) {
      document.getElementById("status").textContent = text;
    }

    async function post(path, body, contentType) {
      const init = { method: "POST", headers: {} };
      if (body !== undefined) {
        init.body = body;
        init.headers["Content-Type"] = contentType || "application/json";
      }
      const response = await fetch(path, init);
      const reply = await response.json().catch(() => ({}));
      if (!response.ok) {
        throw new Error(reply.reason || response.statusText);
      }
      return reply;
    }

    async function refresh() {
      const view = await (await fetch("/api/view")).json();
      if (!centered) {
        map.setView([view.center.lat, view.center.lon], view.zoom);
        centered = true;
      }
      layer.clearLayers();
      for (const marker of view.markers) {
        L.marker([marker.position.lat, marker.position.lon], { icon: markerIcon(marker.label) }).addTo(layer);
      }
      const units = document.getElementById("unit");
      if (units.options.length === 0) {
        for (const unit of view.units) {
          units.add(new Option(unit, unit));
        }
      }
      document.getElementById("point").textContent =
        view.capture_at.lat.toFixed(5) + ", " + view.capture_at.lon.toFixed(5);
      if (!timeEdited) {
        document.getElementById("time").value = view.default_time;
      }
      document.getElementById("undo").hidden = view.point_count === 0;
      document.getElementById("report").hidden = view.point_count === 0;
    }

    async function act(task) {
      try {
        say(await task());
      } catch (err) {
        say("Error: " + err.message);
      }
      await refresh();
    }

    map.on("click", (event) => act(async () => {
      await post("/api/click", JSON.stringify({ lat: event.latlng.lat, lon: event.latlng.lng }));
      timeEdited = false;
      return "";
    }));

    document.getElementById("time").addEventListener("input", () => { timeEdited = true; });

    document.getElementById("capture").addEventListener("submit", (event) => {
      event.preventDefault();
      act(async () => {
        const raw = document.getElementById("value").value;
        const form = {
          value: raw === "" ? null : Number(raw),
          unit: document.getElementById("unit").value,
          time: document.getElementById("time").value
        };
        const reply = await post("/api/points", JSON.stringify(form));
        centered = false;
        timeEdited = false;
        return "Saved. " + reply.point_count + " point(s) in table.";
      });
    });

    document.getElementById("undo").addEventListener("click", () => act(async () => {
      const reply = await post("/api/undo");
      return "Removed. " + reply.point_count + " point(s) left.";
    }));

    document.getElementById("replace").addEventListener("click", () => act(async () => {
      const file = document.getElementById("upload").files[0];
      if (!file) {
        return "Choose a CSV file first.";
      }
      const reply = await post("/api/upload", await file.arrayBuffer(), "text/csv");
      centered = false;
      return "Table replaced with " + reply.point_count + " point(s).";
    }));

    document.getElementById("clear").addEventListener("click", () => {
      if (!confirm("Delete every point?")) {
        return;
      }
      act(async () => {
        await post("/api/clear");
        centered = false;
        return "Table cleared.";
      });
    });

    refresh();
  </script>
</body>
</html>
"#;
