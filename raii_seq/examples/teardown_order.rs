use raii_seq::{Construct, Sequence};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Tracked(usize, Arc<AtomicUsize>);

impl Construct<(usize, &Arc<AtomicUsize>)> for Tracked {
    fn construct((id, counter): (usize, &Arc<AtomicUsize>)) -> Self {
        println!("Constructing element {}", id);
        Tracked(id, counter.clone())
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        println!("Dropping element {}", self.0);
        self.1.fetch_add(1, Ordering::SeqCst);
    }
}

fn main() {
    println!("--- Teardown Order Example ---");
    let drop_count = Arc::new(AtomicUsize::new(0));

    {
        let mut seq: Sequence<Tracked> = Sequence::new();
        for i in 0..3 {
            seq.append_in_place((i, &drop_count));
        }
        println!("Sequence created with {} elements.", seq.len());
        // Scope ends here, elements drop from index 0 upwards
    }

    println!("Total elements dropped: {}", drop_count.load(Ordering::SeqCst));
    assert_eq!(drop_count.load(Ordering::SeqCst), 3);
}
