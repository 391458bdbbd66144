use libfuzzer_sys::arbitrary::{Arbitrary, Result, Unstructured};

/// A single buffer operation, mirrored against a `Vec<u8>` model.
#[derive(Debug)]
pub enum Action {
    Insert(usize, Vec<u8>),
    Append(Vec<u8>),
    Skip(usize),
    RemoveBefore(usize, usize),
    RemoveAfter(usize, usize),
    Truncate(usize),
    Reserve(usize, usize),
    Format(u64),
    Extract,
    Duplicate,
    Clear,
    Reset,
}

#[derive(Debug)]
pub struct FuzzBufferAction {
    pub initial_capacity: usize,
    pub actions: Vec<Action>,
}

fn small(u: &mut Unstructured<'_>) -> Result<usize> {
    u.int_in_range(0..=256)
}

impl<'a> Arbitrary<'a> for Action {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        Ok(match u.int_in_range(0..=11)? {
            0 => Action::Insert(small(u)?, Vec::<u8>::arbitrary(u)?),
            1 => Action::Append(Vec::<u8>::arbitrary(u)?),
            2 => Action::Skip(small(u)?),
            3 => Action::RemoveBefore(small(u)?, small(u)?),
            4 => Action::RemoveAfter(small(u)?, small(u)?),
            5 => Action::Truncate(small(u)?),
            6 => {
                let size = small(u)?;
                Action::Reserve(size, u.int_in_range(0..=size)?)
            }
            7 => Action::Format(u.arbitrary()?),
            8 => Action::Extract,
            9 => Action::Duplicate,
            10 => Action::Clear,
            _ => Action::Reset,
        })
    }
}

impl<'a> Arbitrary<'a> for FuzzBufferAction {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let initial_capacity = u.int_in_range(0..=64)?;
        let action_count = u.int_in_range(1..=64)?;
        let actions = (0..action_count)
            .map(|_| Action::arbitrary(u))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            initial_capacity,
            actions,
        })
    }
}
