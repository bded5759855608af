//! Dense cell storage tracking battlefield occupancy.

use lawn_defence_core::{CellContent, CellCoord, FieldError, PlantId, ZombieId};

/// Lane-major grid holding exactly one [`CellContent`] per cell.
#[derive(Clone, Debug)]
pub(crate) struct FieldGrid {
    lanes: u32,
    columns: u32,
    cells: Vec<CellContent>,
}

impl FieldGrid {
    pub(crate) fn new(lanes: u32, columns: u32) -> Self {
        let capacity_u64 = u64::from(lanes) * u64::from(columns);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            lanes,
            columns,
            cells: vec![CellContent::Empty; capacity],
        }
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        cell.lane() < self.lanes && cell.column() < self.columns
    }

    /// Content of the provided cell, or `None` when it lies outside the grid.
    pub(crate) fn content(&self, cell: CellCoord) -> Option<CellContent> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    pub(crate) fn claim_plant(
        &mut self,
        plant: PlantId,
        cell: CellCoord,
    ) -> Result<(), FieldError> {
        self.claim(CellContent::Plant(plant), cell)
    }

    pub(crate) fn claim_zombie(
        &mut self,
        zombie: ZombieId,
        cell: CellCoord,
    ) -> Result<(), FieldError> {
        self.claim(CellContent::Zombie(zombie), cell)
    }

    fn claim(&mut self, content: CellContent, cell: CellCoord) -> Result<(), FieldError> {
        let Some(index) = self.index(cell) else {
            return Err(FieldError::OutOfBounds);
        };
        match self.cells.get_mut(index) {
            Some(slot) if slot.is_empty() => {
                *slot = content;
                Ok(())
            }
            Some(_) => Err(FieldError::Occupied),
            None => Err(FieldError::OutOfBounds),
        }
    }

    /// Moves whatever occupies `from` into `to`, refusing overwrites.
    pub(crate) fn relocate(&mut self, from: CellCoord, to: CellCoord) -> Result<(), FieldError> {
        let Some(from_index) = self.index(from) else {
            return Err(FieldError::OutOfBounds);
        };
        let Some(to_index) = self.index(to) else {
            return Err(FieldError::OutOfBounds);
        };
        let content = self.cells.get(from_index).copied().unwrap_or_default();
        if content.is_empty() {
            return Err(FieldError::SourceEmpty);
        }
        match self.cells.get(to_index).copied() {
            Some(destination) if destination.is_empty() => {
                self.cells[to_index] = content;
                self.cells[from_index] = CellContent::Empty;
                Ok(())
            }
            Some(_) => Err(FieldError::Occupied),
            None => Err(FieldError::OutOfBounds),
        }
    }

    /// Empties the provided cell, returning what previously occupied it.
    pub(crate) fn release(&mut self, cell: CellCoord) -> Option<CellContent> {
        let index = self.index(cell)?;
        let slot = self.cells.get_mut(index)?;
        let previous = *slot;
        *slot = CellContent::Empty;
        Some(previous)
    }

    pub(crate) fn cells(&self) -> &[CellContent] {
        &self.cells
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.lanes, self.columns)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let lane = usize::try_from(cell.lane()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(lane * width + column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_refuses_occupied_and_out_of_bounds_cells() {
        let mut grid = FieldGrid::new(2, 4);
        let cell = CellCoord::new(1, 2);

        assert_eq!(grid.claim_plant(PlantId::new(0), cell), Ok(()));
        assert_eq!(
            grid.claim_zombie(ZombieId::new(0), cell),
            Err(FieldError::Occupied)
        );
        assert_eq!(
            grid.claim_plant(PlantId::new(1), CellCoord::new(2, 0)),
            Err(FieldError::OutOfBounds)
        );
    }

    #[test]
    fn relocate_moves_content_and_refuses_overwrites() {
        let mut grid = FieldGrid::new(1, 4);
        let zombie = ZombieId::new(7);
        assert_eq!(grid.claim_zombie(zombie, CellCoord::new(0, 3)), Ok(()));

        assert_eq!(
            grid.relocate(CellCoord::new(0, 3), CellCoord::new(0, 2)),
            Ok(())
        );
        assert_eq!(
            grid.content(CellCoord::new(0, 2)),
            Some(CellContent::Zombie(zombie))
        );
        assert_eq!(
            grid.content(CellCoord::new(0, 3)),
            Some(CellContent::Empty)
        );

        assert_eq!(grid.claim_plant(PlantId::new(0), CellCoord::new(0, 1)), Ok(()));
        assert_eq!(
            grid.relocate(CellCoord::new(0, 2), CellCoord::new(0, 1)),
            Err(FieldError::Occupied)
        );
        assert_eq!(
            grid.relocate(CellCoord::new(0, 3), CellCoord::new(0, 2)),
            Err(FieldError::SourceEmpty)
        );
    }

    #[test]
    fn release_returns_previous_content() {
        let mut grid = FieldGrid::new(1, 3);
        let cell = CellCoord::new(0, 2);
        assert_eq!(grid.claim_zombie(ZombieId::new(3), cell), Ok(()));

        assert_eq!(grid.release(cell), Some(CellContent::Zombie(ZombieId::new(3))));
        assert_eq!(grid.content(cell), Some(CellContent::Empty));
        assert_eq!(grid.release(CellCoord::new(5, 5)), None);
    }
}
