use super::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use crossbeam::scope;

/// 记录生命周期事件的测试元素
#[derive(Debug)]
struct Witness {
    id: u32,
    log: Rc<RefCell<Vec<String>>>,
}

impl Witness {
    fn new(id: u32, log: &Rc<RefCell<Vec<String>>>) -> Self {
        log.borrow_mut().push(format!("new {}", id));
        Witness { id, log: log.clone() }
    }
}

impl Clone for Witness {
    fn clone(&self) -> Self {
        self.log.borrow_mut().push(format!("clone {}", self.id));
        Witness { id: self.id, log: self.log.clone() }
    }
}

impl Drop for Witness {
    fn drop(&mut self) {
        self.log.borrow_mut().push(format!("drop {}", self.id));
    }
}

impl<'a> Construct<(u32, &'a Rc<RefCell<Vec<String>>>)> for Witness {
    fn construct((id, log): (u32, &'a Rc<RefCell<Vec<String>>>)) -> Self {
        Witness::new(id, log)
    }
}

fn new_log() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}

fn take(log: &Rc<RefCell<Vec<String>>>) -> Vec<String> {
    log.borrow_mut().drain(..).collect()
}

#[test]
fn test_basic_push_pop() {
    let mut v = Sequence::new();
    assert_eq!(v.len(), 0);
    assert!(v.is_empty());
    v.push(1);
    v.push(2);
    v.push(3);
    assert_eq!(v.len(), 3);
    assert_eq!(v[0], 1);
    assert_eq!(v[1], 2);
    assert_eq!(v[2], 3);
    assert_eq!(v.pop(), Some(3));
    assert_eq!(v.pop(), Some(2));
    assert_eq!(v.pop(), Some(1));
    assert_eq!(v.pop(), None);
}

#[test]
fn test_growth_doubles_from_zero() {
    let mut v = Sequence::new();
    assert_eq!(v.capacity(), 0);
    let mut seen = Vec::new();
    for i in 0..5 {
        v.push(i);
        seen.push(v.capacity());
    }
    assert_eq!(seen, vec![1, 2, 4, 4, 8]);
    assert_eq!(v.as_ref(), &[0, 1, 2, 3, 4]);
}

#[test]
fn test_with_capacity_does_not_grow_early() {
    let mut v = Sequence::with_capacity(3);
    assert_eq!(v.capacity(), 3);
    v.push(1);
    v.push(2);
    v.push(3);
    assert_eq!(v.capacity(), 3);
    v.push(4);
    assert_eq!(v.capacity(), 6);
}

#[test]
fn test_raii_drop() {
    let counter = Arc::new(AtomicUsize::new(0));
    struct Droppable(Arc<AtomicUsize>);
    impl Drop for Droppable {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    {
        let mut v = Sequence::new();
        for _ in 0..10 {
            v.push(Droppable(counter.clone()));
        }
        // 扩容只移动元素，不析构
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn test_append_in_place_never_clones() {
    let log = new_log();
    {
        let mut v: Sequence<Witness> = Sequence::new();
        v.append_in_place((1, &log));
        v.append_in_place((11, &log));
        v.append_in_place((21, &log));
        assert_eq!(v.len(), 3);
        assert_eq!(take(&log), vec!["new 1", "new 11", "new 21"]);
    }
    assert_eq!(take(&log), vec!["drop 1", "drop 11", "drop 21"]);
}

#[test]
fn test_append_by_copy_clones_temporary() {
    let log = new_log();
    {
        let mut v: Sequence<Witness> = Sequence::new();
        v.append_by_copy(&Witness::new(1, &log));
        v.append_by_copy(&Witness::new(11, &log));
        assert_eq!(
            take(&log),
            vec!["new 1", "clone 1", "drop 1", "new 11", "clone 11", "drop 11"]
        );
        assert_eq!(v.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 11]);
    }
    assert_eq!(take(&log), vec!["drop 1", "drop 11"]);
}

#[test]
fn test_insert_dispatches_on_variant() {
    let log = new_log();
    let mut v: Sequence<Witness> = Sequence::new();
    let original = Witness::new(7, &log);
    v.insert::<(u32, &Rc<RefCell<Vec<String>>>)>(Insertion::ByValue(&original));
    v.insert(Insertion::ByConstruction((8, &log)));
    assert_eq!(take(&log), vec!["new 7", "clone 7", "new 8"]);
    assert_eq!(original.id, 7);
    assert_eq!(v.iter().map(|p| p.id).collect::<Vec<_>>(), vec![7, 8]);
}

#[test]
fn test_duplicate_growth_copies_then_drops_old() {
    let log = new_log();
    let mut v: Sequence<Witness> = Sequence::new().duplicate_on_growth();
    assert_eq!(v.growth_policy(), GrowthPolicy::Duplicate);

    v.append_in_place((1, &log));
    v.append_in_place((2, &log));
    v.append_in_place((3, &log));
    assert_eq!(
        take(&log),
        vec![
            "new 1",
            // 1 -> 2
            "clone 1", "drop 1", "new 2",
            // 2 -> 4
            "clone 1", "clone 2", "drop 1", "drop 2", "new 3",
        ]
    );
    assert_eq!(v.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_relocate_growth_is_silent() {
    let log = new_log();
    let mut v: Sequence<Witness> = Sequence::new();
    assert_eq!(v.growth_policy(), GrowthPolicy::Relocate);
    for id in 0..9 {
        v.append_in_place((id, &log));
    }
    assert!(take(&log).iter().all(|e| e.starts_with("new")));
    assert_eq!(v.iter().map(|p| p.id).collect::<Vec<_>>(), (0..9).collect::<Vec<_>>());
}

#[test]
fn test_duplicate_growth_panic_leaves_sequence_intact() {
    let drops = Rc::new(RefCell::new(Vec::new()));
    let clones = Rc::new(AtomicUsize::new(0));

    struct Fragile {
        id: u32,
        drops: Rc<RefCell<Vec<u32>>>,
        clones: Rc<AtomicUsize>,
    }
    impl Clone for Fragile {
        fn clone(&self) -> Self {
            if self.clones.fetch_add(1, Ordering::SeqCst) == 1 {
                panic!("clone failed");
            }
            Fragile { id: self.id, drops: self.drops.clone(), clones: self.clones.clone() }
        }
    }
    impl Drop for Fragile {
        fn drop(&mut self) {
            self.drops.borrow_mut().push(self.id);
        }
    }

    let mut v = Sequence::with_capacity(2).duplicate_on_growth();
    v.push(Fragile { id: 1, drops: drops.clone(), clones: clones.clone() });
    v.push(Fragile { id: 2, drops: drops.clone(), clones: clones.clone() });

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        v.push(Fragile { id: 3, drops: drops.clone(), clones: clones.clone() });
    }));
    assert!(result.is_err());
    // 先析构已复制的 1，再析构未写入的 3，原有元素保持不变
    assert_eq!(*drops.borrow(), vec![1, 3]);
    assert_eq!(v.len(), 2);
    assert_eq!(v.capacity(), 2);
    assert_eq!(v.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_clear_drops_in_index_order_and_keeps_capacity() {
    let log = new_log();
    let mut v: Sequence<Witness> = Sequence::new();
    for id in [5, 6, 7] {
        v.append_in_place((id, &log));
    }
    take(&log);
    let cap = v.capacity();
    v.clear();
    assert_eq!(take(&log), vec!["drop 5", "drop 6", "drop 7"]);
    assert!(v.is_empty());
    assert_eq!(v.capacity(), cap);
}

#[test]
fn test_iterators() {
    let mut v = Sequence::new();
    v.push(10);
    v.push(20);
    v.push(30);

    let mut sum = 0;
    for &x in &v {
        sum += x;
    }
    assert_eq!(sum, 60);

    for x in &mut v {
        *x += 1;
    }
    assert_eq!(v[0], 11);

    let collected: Vec<i32> = v.into_iter().collect();
    assert_eq!(collected, vec![11, 21, 31]);
}

#[test]
fn test_into_iter_drops_remaining() {
    let log = new_log();
    let mut v: Sequence<Witness> = Sequence::new();
    for id in [1, 2, 3] {
        v.append_in_place((id, &log));
    }
    take(&log);

    let mut iter = v.into_iter();
    assert_eq!(iter.len(), 3);
    let first = iter.next().map(|p| p.id);
    assert_eq!(first, Some(1));
    drop(iter);
    assert_eq!(take(&log), vec!["drop 1", "drop 2", "drop 3"]);
}

#[test]
fn test_debug_lists_elements() {
    let mut v = Sequence::new();
    v.push(1);
    v.push(11);
    assert_eq!(format!("{:?}", v), "[1, 11]");
}

#[test]
fn test_concurrency() {
    let mut v = Sequence::new();
    for i in 0..100 {
        v.push(i);
    }

    scope(|s| {
        s.spawn(|_| {
            for x in &v {
                let _ = *x;
            }
        });
        s.spawn(|_| {
            assert_eq!(v.iter().sum::<i32>(), 4950);
        });
    }).unwrap();
}

#[test]
fn test_try_reserve() {
    let mut v: Sequence<i32> = Sequence::new();
    assert!(v.try_reserve(10).is_ok());
    assert!(v.capacity() >= 10);
    assert_eq!(v.try_reserve(usize::MAX), Err(TryReserveError::CapacityOverflow));
    assert_eq!(v.capacity(), 10);
}

#[test]
#[should_panic(expected = "Zero-sized types are not supported")]
fn test_zero_sized_rejected() {
    let _v: Sequence<()> = Sequence::new();
}
