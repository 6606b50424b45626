use crate::core::classify::MarkerDirective;
use serde::Serialize;
use std::collections::HashMap;

const TILE_SIZE: f64 = 256.0;
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    /// 像素半徑
    pub max_cluster_radius: f64,
    pub disable_clustering_at_zoom: u8,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_cluster_radius: 80.0,
            disable_clustering_at_zoom: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterVisual {
    Single,
    Dual,
    Split,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub latitude: f64,
    pub longitude: f64,
    /// 成員在標記圖層中的索引
    pub members: Vec<usize>,
    pub dual_count: usize,
    pub visual: ClusterVisual,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClusterNode {
    Marker { index: usize },
    Cluster(Cluster),
}

/// 雙口味成員過半 → Dual；不足一半 → Single；剛好一半 → Split
pub fn cluster_visual(dual: usize, total: usize) -> ClusterVisual {
    match (dual * 2).cmp(&total) {
        std::cmp::Ordering::Greater => ClusterVisual::Dual,
        std::cmp::Ordering::Less => ClusterVisual::Single,
        std::cmp::Ordering::Equal => ClusterVisual::Split,
    }
}

/// Web Mercator 投影到指定縮放層級的像素座標
pub fn project(latitude: f64, longitude: f64, zoom: u8) -> (f64, f64) {
    let scale = TILE_SIZE * f64::from(1u32 << zoom.min(30));
    let lat = latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();

    let x = (longitude + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * scale;
    (x, y)
}

struct Bucket {
    anchor: (f64, f64),
    members: Vec<usize>,
}

/// 貪婪式網格群集：每個標記加入半徑內最近的群集，否則自成一群
pub fn cluster_markers(
    markers: &[MarkerDirective],
    zoom: u8,
    options: &ClusterOptions,
) -> Vec<ClusterNode> {
    if zoom >= options.disable_clustering_at_zoom || options.max_cluster_radius <= 0.0 {
        return (0..markers.len())
            .map(|index| ClusterNode::Marker { index })
            .collect();
    }

    let radius = options.max_cluster_radius;
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();

    for (index, marker) in markers.iter().enumerate() {
        let point = project(marker.latitude, marker.longitude, zoom);
        let cell = ((point.0 / radius).floor() as i64, (point.1 / radius).floor() as i64);

        let mut nearest: Option<(usize, f64)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(candidates) = grid.get(&(cell.0 + dx, cell.1 + dy)) else {
                    continue;
                };
                for &bucket_index in candidates {
                    let anchor = buckets[bucket_index].anchor;
                    let distance = (anchor.0 - point.0).powi(2) + (anchor.1 - point.1).powi(2);
                    if distance <= radius * radius
                        && nearest.map_or(true, |(_, best)| distance < best)
                    {
                        nearest = Some((bucket_index, distance));
                    }
                }
            }
        }

        match nearest {
            Some((bucket_index, _)) => buckets[bucket_index].members.push(index),
            None => {
                grid.entry(cell).or_default().push(buckets.len());
                buckets.push(Bucket {
                    anchor: point,
                    members: vec![index],
                });
            }
        }
    }

    buckets
        .into_iter()
        .map(|bucket| {
            if bucket.members.len() == 1 {
                return ClusterNode::Marker {
                    index: bucket.members[0],
                };
            }

            let count = bucket.members.len() as f64;
            let latitude = bucket.members.iter().map(|&i| markers[i].latitude).sum::<f64>() / count;
            let longitude = bucket.members.iter().map(|&i| markers[i].longitude).sum::<f64>() / count;
            let dual_count = bucket.members.iter().filter(|&&i| markers[i].is_dual()).count();

            ClusterNode::Cluster(Cluster {
                latitude,
                longitude,
                visual: cluster_visual(dual_count, bucket.members.len()),
                dual_count,
                members: bucket.members,
            })
        })
        .collect()
}
