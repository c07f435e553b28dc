use raii_seq::{Construct, Insertion, Sequence};

struct Noisy(i32);

impl Noisy {
    fn new(value: i32) -> Self {
        println!("  build {}", value);
        Noisy(value)
    }
}

impl Clone for Noisy {
    fn clone(&self) -> Self {
        println!("  clone {}", self.0);
        Noisy(self.0)
    }
}

impl Drop for Noisy {
    fn drop(&mut self) {
        println!("  drop {}", self.0);
    }
}

impl Construct<i32> for Noisy {
    fn construct(value: i32) -> Self {
        Noisy::new(value)
    }
}

fn show(label: &str, seq: &Sequence<Noisy>) {
    let values: Vec<i32> = seq.iter().map(|n| n.0).collect();
    println!("{}: {:?}, len: {}, cap: {}", label, values, seq.len(), seq.capacity());
}

fn main() {
    println!("--- Copy vs In-place Append ---");
    {
        let mut seq = Sequence::new();
        println!("append_by_copy(1):");
        seq.append_by_copy(&Noisy::new(1));
        println!("append_in_place(2):");
        seq.append_in_place(2);
        println!("insert(ByValue(3)):");
        let three = Noisy::new(3);
        seq.insert(Insertion::<_, i32>::ByValue(&three));
        show("after appends", &seq);
        println!("teardown:");
    }

    println!();
    println!("--- Duplicate On Growth ---");
    {
        let mut seq: Sequence<Noisy> = Sequence::new().duplicate_on_growth();
        for value in [10, 20, 30] {
            println!("append_in_place({}):", value);
            seq.append_in_place(value);
        }
        show("after appends", &seq);
        println!("teardown:");
    }
}
