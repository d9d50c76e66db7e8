use std::collections::HashSet;

use nalgebra::{Point2, Vector2};
use orthtree::prelude::*;

fn area(lower: [f64; 2], upper: [f64; 2]) -> BoundingVolume2D<f64> {
    BoundingVolume::new(Vector2::from(lower), Vector2::from(upper))
}

fn tree(size: f64, minimum: f64) -> QuadTree<&'static str, f64> {
    let configuration = TreeConfiguration::new(area([0., 0.], [size, size]))
        .with_minimum_size_element(minimum);
    QuadTree::try_new(configuration).unwrap()
}

#[test]
fn test_trivial_quad() {
    let mut tree = tree(128., 2.);
    assert!(tree.insert("a", area([1., 1.], [2., 2.])));
    assert!(tree.insert("b", area([100., 1.], [101., 2.])));
    assert!(tree.insert("c", area([1., 100.], [2., 101.])));
    assert!(tree.insert("d", area([100., 100.], [101., 101.])));
    assert!(tree.insert("center", area([60., 60.], [70., 70.])));
    assert_eq!(tree.len(), 5);

    let mut found = HashSet::new();
    tree.contained_by(&area([0., 0.], [64., 64.]), &mut found);
    assert_eq!(found, HashSet::from(["a"]));

    // "center" straddles the split at 64 and is found by overlap only
    let mut found = HashSet::new();
    tree.overlapped_by(&area([64., 64.], [128., 128.]), &mut found);
    assert_eq!(found, HashSet::from(["d", "center"]));

    let mut objects = vec![];
    tree.iterate_orthants(&mut objects, |objects, orthant, _| {
        objects.extend(orthant.objects().keys().copied());
        TreeVisitResult::Continue
    });
    objects.sort();
    assert_eq!(objects, vec!["a", "b", "c", "center", "d"]);
}

#[test]
fn test_insert_limit() {
    let mut tree = tree(16., 8.);
    assert!(tree.insert("small", area([0., 0.], [1., 1.])));
    assert_eq!(tree.orthant_count(), 5);
    assert_eq!(tree.depth(), 1);

    // a leaf that cannot be split takes every item that fits
    assert!(tree.insert("other", area([3., 3.], [4., 4.])));
    assert_eq!(tree.orthant_count(), 5);

    assert!(!tree.insert("large", area([0., 0.], [17., 1.])));
    assert!(tree.insert("domain", area([0., 0.], [16., 16.])));
    assert_eq!(tree.len(), 3);
}

#[test]
fn test_raycast_orthants() {
    let mut tree = tree(128., 32.);
    tree.insert("a", area([0., 0.], [1., 1.]));
    assert_eq!(tree.orthant_count(), 9);

    let ray = Ray::new(Point2::new(0., 1.), Vector2::x());
    let orthants = tree.raycast_orthants(&ray);
    let volumes: Vec<_> = orthants.iter().map(|o| o.volume().clone()).collect();
    let distances: Vec<_> = orthants.iter().map(|o| o.distance()).collect();
    assert_eq!(
        volumes,
        vec![
            area([0., 0.], [32., 32.]),
            area([32., 0.], [64., 32.]),
            area([64., 0.], [128., 64.]),
        ]
    );
    assert_eq!(distances, vec![0., 32., 64.]);

    // along a boundary both neighbouring leaves are crossed, in tree order on ties
    let ray = Ray::new(Point2::new(0., 32.), Vector2::x());
    let volumes: Vec<_> = tree
        .raycast_orthants(&ray)
        .into_iter()
        .map(|o| (o.volume().clone(), o.distance()))
        .collect();
    assert_eq!(
        volumes,
        vec![
            (area([0., 0.], [32., 32.]), 0.),
            (area([0., 32.], [32., 64.]), 0.),
            (area([32., 0.], [64., 32.]), 32.),
            (area([32., 32.], [64., 64.]), 32.),
            (area([64., 0.], [128., 64.]), 64.),
        ]
    );

    // items play no part
    let away = Ray::new(Point2::new(-1., 100.), -Vector2::x());
    assert!(tree.raycast_orthants(&away).is_empty());
}

#[test]
fn test_visitor_reconstructs_items() {
    let mut tree = tree(64., 2.);
    let items = [
        ("a", area([0., 0.], [3., 3.])),
        ("b", area([30., 30.], [34., 34.])),
        ("c", area([50., 10.], [51., 11.])),
        ("d", area([10., 50.], [12., 52.])),
    ];
    for (name, volume) in items.iter() {
        tree.insert(*name, volume.clone());
    }

    let mut rebuilt: QuadTree<&str, f64> = QuadTree::try_new(tree.configuration().clone()).unwrap();
    tree.iterate_orthants(&mut rebuilt, |rebuilt, orthant, _| {
        for (name, volume) in orthant.objects() {
            rebuilt.insert(*name, volume.clone());
        }
        TreeVisitResult::Continue
    });
    assert_eq!(rebuilt, tree);

    let collected: HashSet<_> = tree.iter().map(|(name, _)| *name).collect();
    assert_eq!(collected, HashSet::from(["a", "b", "c", "d"]));
}

#[test]
fn test_f32_tree() {
    let domain = BoundingVolume::new(Vector2::new(0f32, 0.), Vector2::new(10f32, 10.));
    let configuration = TreeConfiguration::new(domain).with_minimum_size_element(0.5);
    let mut tree = QuadTree::<u32, f32>::try_new(configuration).unwrap();
    tree.insert(1, BoundingVolume::new(Vector2::new(1., 1.), Vector2::new(2., 2.)));
    let hits = tree.raycast(&Ray::new(Point2::new(0., 1.5), Vector2::x()));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].distance(), 1.);
}
