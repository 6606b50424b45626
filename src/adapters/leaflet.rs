use crate::config::toml_config::MessageConfig;
use crate::core::map::MapScene;
use crate::utils::error::Result;
use serde_json::json;

const SCENE_PLACEHOLDER: &str = "__STORE_MAP_SCENE__";

/// Leaflet + markercluster 靜態頁面；資料以 JSON 內嵌
pub const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>霜淇淋地圖</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"></script>
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.css" />
  <script src="https://unpkg.com/leaflet.markercluster@1.4.1/dist/leaflet.markercluster.js"></script>
  <style>
    html, body, #map { height: 100%; margin: 0; }
    .store-pin { width: 18px; height: 18px; border-radius: 50% 50% 50% 0; transform: rotate(-45deg); border: 2px solid #fff; box-shadow: 0 1px 3px rgba(0,0,0,.4); }
    .store-pin.striped { background-image: repeating-linear-gradient(45deg, rgba(255,255,255,.55) 0 3px, transparent 3px 6px) !important; }
    .store-cluster { border-radius: 50%; color: #fff; font-weight: 600; display: flex; align-items: center; justify-content: center; border: 3px solid rgba(255,255,255,.8); }
    .user-dot { width: 14px; height: 14px; border-radius: 50%; background: #1E90FF; border: 3px solid #fff; box-shadow: 0 0 6px #1E90FF; }
    .legend { background: #fff; padding: 6px 10px; border-radius: 6px; font: 13px sans-serif; line-height: 1.8; }
    .legend span { display: inline-block; width: 12px; height: 12px; border-radius: 50%; margin-right: 6px; vertical-align: middle; }
    .legend span.striped { background-image: repeating-linear-gradient(45deg, rgba(255,255,255,.6) 0 2px, transparent 2px 4px) !important; }
    #status-bar { position: absolute; left: 10px; bottom: 24px; z-index: 1000; background: rgba(255,255,255,.9); padding: 4px 8px; border-radius: 4px; font: 12px sans-serif; }
    #status-bar:empty { display: none; }
    #toasts { position: absolute; top: 10px; left: 50%; transform: translateX(-50%); z-index: 2000; }
    .toast { margin-bottom: 6px; padding: 8px 14px; border-radius: 4px; color: #fff; font: 14px sans-serif; background: #333; }
    .toast.error { background: #c0392b; }
    .toast.success { background: #27ae60; }
    .store-popup h3 { margin: 0 0 4px; font-size: 15px; }
    .store-popup p { margin: 2px 0; }
  </style>
</head>
<body>
  <div id="map"></div>
  <div id="status-bar"></div>
  <div id="toasts"></div>
  <script>
    const scene = __STORE_MAP_SCENE__;

    function toast(level, message) {
      const last = toast.lastError;
      const now = Date.now();
      if (level === 'error') {
        if (last && last.message === message && now - last.at < scene.throttleMs) return;
        toast.lastError = { message, at: now };
      }
      const node = document.createElement('div');
      node.className = 'toast ' + level;
      node.textContent = message;
      document.getElementById('toasts').appendChild(node);
      setTimeout(() => node.remove(), 4000);
    }

    function pinIcon(marker) {
      const color = marker.flavor === 'dual' ? scene.map.clusterColors.dual : scene.map.clusterColors.single;
      return L.divIcon({
        className: '',
        html: `<div class="store-pin${marker.striped ? ' striped' : ''}" style="background-color:${color}"></div>`,
        iconSize: [18, 18],
        iconAnchor: [9, 18],
        popupAnchor: [0, -18]
      });
    }

    function clusterIcon(cluster) {
      const children = cluster.getAllChildMarkers();
      const dual = children.filter(m => m.options.dual).length;
      const colors = scene.map.clusterColors;
      const color = dual * 2 > children.length ? colors.dual : dual * 2 < children.length ? colors.single : colors.split;
      const size = children.length < 10 ? 32 : children.length < 100 ? 40 : 48;
      return L.divIcon({
        className: '',
        html: `<div class="store-cluster" style="background:${color};width:${size}px;height:${size}px">${children.length}</div>`,
        iconSize: [size, size]
      });
    }

    const view = scene.map.viewport;
    const map = L.map('map').setView([view.latitude, view.longitude], view.zoom);
    const tiles = scene.map.tiles;
    if (tiles) {
      L.tileLayer(tiles.urlTemplate, { attribution: tiles.attribution, minZoom: tiles.minZoom, maxZoom: tiles.maxZoom }).addTo(map);
    }

    const layer = L.markerClusterGroup({
      maxClusterRadius: scene.map.maxClusterRadius,
      disableClusteringAtZoom: scene.map.disableClusteringAtZoom,
      iconCreateFunction: clusterIcon
    });
    layer.addLayers(scene.map.markers.map(m =>
      L.marker([m.latitude, m.longitude], { title: m.title, icon: pinIcon(m), dual: m.flavor === 'dual' }).bindPopup(m.popupHtml)
    ));
    map.addLayer(layer);

    const legend = L.control({ position: 'bottomright' });
    legend.onAdd = () => {
      const div = L.DomUtil.create('div', 'legend');
      for (const entry of scene.map.legend) {
        const row = document.createElement('div');
        const dot = document.createElement('span');
        dot.style.backgroundColor = entry.color;
        if (entry.striped) dot.className = 'striped';
        row.appendChild(dot);
        row.appendChild(document.createTextNode(entry.label));
        div.appendChild(row);
      }
      return div;
    };
    legend.addTo(map);

    if (scene.map.lastUpdatedText) {
      document.getElementById('status-bar').textContent = scene.map.lastUpdatedText;
    }

    let userMarker = null;
    let watchId = null;
    function placeUser(lat, lng) {
      if (userMarker) userMarker.setLatLng([lat, lng]);
      else userMarker = L.marker([lat, lng], { icon: L.divIcon({ className: '', html: '<div class="user-dot"></div>', iconSize: [20, 20] }) }).addTo(map);
    }
    function geoMessage(error) {
      const m = scene.messages;
      if (!error) return m.geo_not_supported;
      switch (error.code) {
        case 1: return m.geo_permission_denied;
        case 2: return m.geo_position_unavailable;
        case 3: return m.geo_timeout;
        default: return m.geo_unknown;
      }
    }
    function locate(userInitiated) {
      const fail = error => userInitiated ? toast('error', geoMessage(error)) : console.warn('auto-locate failed', error);
      if (!navigator.geolocation) return fail(null);
      navigator.geolocation.getCurrentPosition(pos => {
        const { latitude, longitude } = pos.coords;
        map.setView([latitude, longitude], scene.locateZoom);
        placeUser(latitude, longitude);
        if (userInitiated) toast('success', scene.messages.locate_success);
        if (watchId !== null) navigator.geolocation.clearWatch(watchId);
        watchId = navigator.geolocation.watchPosition(
          p => placeUser(p.coords.latitude, p.coords.longitude),
          e => console.warn('watch error', e)
        );
      }, fail, { timeout: scene.locateTimeoutMs, enableHighAccuracy: true });
    }

    const locateControl = L.control({ position: 'topleft' });
    locateControl.onAdd = () => {
      const bar = L.DomUtil.create('div', 'leaflet-bar');
      const button = L.DomUtil.create('a', '', bar);
      button.href = '#';
      button.title = '定位';
      button.textContent = '◎';
      L.DomEvent.on(button, 'click', e => { L.DomEvent.preventDefault(e); locate(true); });
      return bar;
    };
    if (scene.map.locateControl) locateControl.addTo(map);

    if (scene.autoLocate) locate(false);
  </script>
</body>
</html>
"#;

#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    pub locate_zoom: u8,
    pub locate_timeout_ms: u64,
    pub throttle_ms: u64,
    pub auto_locate: bool,
}

/// 產生頁面；內嵌 JSON 中的 `</` 改寫為 `<\/` 以免提前結束 script
pub fn render_page(scene: &MapScene, messages: &MessageConfig, options: PageOptions) -> Result<String> {
    let payload = json!({
        "map": scene,
        "messages": messages,
        "locateZoom": options.locate_zoom,
        "locateTimeoutMs": options.locate_timeout_ms,
        "throttleMs": options.throttle_ms,
        "autoLocate": options.auto_locate,
    });

    let embedded = serde_json::to_string(&payload)?.replace("</", "<\\/");
    Ok(PAGE_TEMPLATE.replacen(SCENE_PLACEHOLDER, &embedded, 1))
}
