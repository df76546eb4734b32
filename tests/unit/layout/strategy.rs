use super::*;

struct Fixed {
    id: String,
    rect: Rect,
    priority: i32,
    flexible: bool,
}

impl LayoutElement for Fixed {
    fn element_id(&self) -> &str {
        &self.id
    }

    fn required_rect(&self, _: u32, _: u32) -> LyricResult<Rect> {
        Ok(self.rect)
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_flexible(&self) -> bool {
        self.flexible
    }
}

fn el(id: &str, y: i32, h: i32, priority: i32) -> Arc<dyn LayoutElement> {
    Arc::new(Fixed {
        id: id.to_owned(),
        rect: Rect::new(0, y, 1280, h).unwrap(),
        priority,
        flexible: true,
    })
}

#[test]
fn stacks_by_priority_and_centers() {
    let strategy = VerticalStackStrategy {
        spacing: 30,
        start_y: None,
    };
    let elements = vec![el("aux", 300, 60, 10), el("main", 310, 100, 1)];
    let out = strategy.compute(&elements, 1280, 720).unwrap();
    assert_eq!(out.positions["main"], Rect::new(0, 265, 1280, 100).unwrap());
    assert_eq!(out.positions["aux"], Rect::new(0, 395, 1280, 60).unwrap());
    assert!(!out.has_conflicts);
}

#[test]
fn registration_order_does_not_matter() {
    let strategy = VerticalStackStrategy::default();
    let a = el("a", 0, 120, 2);
    let b = el("b", 0, 80, 1);
    let c = el("c", 0, 50, 3);
    let orders = [
        vec![a.clone(), b.clone(), c.clone()],
        vec![c.clone(), b.clone(), a.clone()],
        vec![b.clone(), c.clone(), a.clone()],
    ];
    let first = strategy.compute(&orders[0], 1280, 720).unwrap();
    for order in &orders {
        let out = strategy.compute(order, 1280, 720).unwrap();
        assert_eq!(out, first);
        let rects: Vec<&Rect> = out.positions.values().collect();
        for i in 0..rects.len() {
            for j in i + 1..rects.len() {
                assert!(!rects[i].overlaps(rects[j]));
            }
        }
    }
    assert_eq!(first.positions["b"].y(), (720 - (80 + 120 + 50 + 40)) / 2);
}

#[test]
fn equal_priorities_keep_registration_order() {
    let strategy = VerticalStackStrategy {
        spacing: 0,
        start_y: Some(10),
    };
    let out = strategy
        .compute(&[el("x", 0, 50, 0), el("y", 0, 50, 0)], 1280, 720)
        .unwrap();
    assert_eq!(out.positions["x"].y(), 10);
    assert_eq!(out.positions["y"].y(), 60);
}

#[test]
fn inflexible_elements_stay_put() {
    let pinned: Arc<dyn LayoutElement> = Arc::new(Fixed {
        id: "pinned".to_owned(),
        rect: Rect::new(0, 600, 1280, 100).unwrap(),
        priority: 0,
        flexible: false,
    });
    let strategy = VerticalStackStrategy::default();
    let out = strategy
        .compute(&[pinned, el("flow", 0, 100, 5)], 1280, 720)
        .unwrap();
    assert_eq!(out.positions["pinned"].y(), 600);
    assert_eq!(out.positions["flow"].y(), 310);
    assert!(!out.has_conflicts);
}

#[test]
fn overflow_is_reported() {
    let strategy = VerticalStackStrategy::default();
    let out = strategy
        .compute(&[el("a", 0, 500, 1), el("b", 0, 500, 2)], 1280, 720)
        .unwrap();
    assert!(out.has_conflicts);
    assert_eq!(out.conflict_notes.len(), 2);
    // Still no pairwise overlap.
    assert!(!out.positions["a"].overlaps(&out.positions["b"]));
    assert_eq!(out.positions["a"].y(), -150);
}

#[test]
fn pinned_overlap_is_reported() {
    let pinned: Arc<dyn LayoutElement> = Arc::new(Fixed {
        id: "pinned".to_owned(),
        rect: Rect::new(0, 300, 1280, 100).unwrap(),
        priority: 0,
        flexible: false,
    });
    let out = VerticalStackStrategy::default()
        .compute(&[pinned, el("flow", 0, 100, 5)], 1280, 720)
        .unwrap();
    assert!(out.has_conflicts);
    assert!(out.conflict_notes[0].contains("pinned overlaps flow"));
}

#[test]
fn strategy_json_defaults() {
    let s: LayoutStrategy = serde_json::from_str(r#"{"kind":"vertical_stack"}"#).unwrap();
    assert_eq!(s, LayoutStrategy::default());
    let s: VerticalStackStrategy = serde_json::from_str(r#"{"start_y":12}"#).unwrap();
    assert_eq!(s.spacing, 20);
    assert_eq!(s.start_y, Some(12));
}
