use crate::draw::model::DrawnElement;

/// Committed annotations in drawing order. Only ever appended to, except for
/// undoing the newest element and clearing everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Canvas {
    elements: Vec<DrawnElement>,
}

impl Canvas {
    /// Appends `element`. Elements without the points their tool needs are
    /// refused and `false` is returned.
    pub fn commit(&mut self, element: DrawnElement) -> bool {
        if !element.is_committable() {
            tracing::debug!(tool = ?element.tool, points = element.points.len(), "refusing incomplete element");
            return false;
        }
        self.elements.push(element);
        true
    }

    pub fn undo(&mut self) -> Option<DrawnElement> {
        self.elements.pop()
    }

    /// Removes every element and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let removed = self.elements.len();
        self.elements.clear();
        removed
    }

    pub fn elements(&self) -> &[DrawnElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::{Color, Point, Tool};

    fn sample_element(id: f32) -> DrawnElement {
        DrawnElement::new(
            Tool::Line,
            Color::RED,
            3.0,
            vec![Point::new(id, id), Point::new(id + 1.0, id + 1.0)],
        )
    }

    #[test]
    fn undo_removes_newest_only() {
        let mut canvas = Canvas::default();
        let first = sample_element(1.0);
        let second = sample_element(2.0);
        canvas.commit(first.clone());
        canvas.commit(second.clone());
        canvas.commit(sample_element(3.0));

        canvas.undo();
        assert_eq!(canvas.len(), 2);
        assert_eq!(canvas.elements(), &[first.clone(), second]);

        canvas.undo();
        assert_eq!(canvas.undo(), Some(first));
        assert_eq!(canvas.undo(), None);
        assert!(canvas.is_empty());
    }

    #[test]
    fn clear_empties_the_canvas() {
        let mut canvas = Canvas::default();
        canvas.commit(sample_element(0.0));
        canvas.commit(sample_element(5.0));
        assert_eq!(canvas.clear(), 2);
        assert!(canvas.is_empty());
        assert_eq!(canvas.clear(), 0);
    }

    #[test]
    fn incomplete_elements_are_refused() {
        let mut canvas = Canvas::default();
        let lone = DrawnElement::new(Tool::Rectangle, Color::RED, 3.0, vec![Point::new(1.0, 1.0)]);
        assert!(!canvas.commit(lone));
        assert!(canvas.is_empty());
    }
}
