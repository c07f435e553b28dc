use std::alloc::{alloc, dealloc, realloc, handle_alloc_error, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryReserveError {
    #[error("capacity overflow")]
    CapacityOverflow,
    #[error("allocation of {capacity} elements failed")]
    AllocFailed { capacity: usize },
}

/// 由原始参数就地构造元素（emplace 语义）
pub trait Construct<Args>: Sized {
    fn construct(args: Args) -> Self;
}

/// 插入方式：复制已有实例，或由原始参数直接在存储中构造
pub enum Insertion<'a, T, A> {
    ByValue(&'a T),
    ByConstruction(A),
}

/// 扩容时如何迁移已有元素
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// 按位移动，不产生任何生命周期事件
    #[default]
    Relocate,
    /// 逐个复制到新存储，再按索引顺序析构旧元素
    Duplicate,
}

type DuplicateFn<T> = unsafe fn(src: *const T, dst: *mut T, len: usize);

enum Growth<T> {
    Relocate,
    Duplicate(DuplicateFn<T>),
}

/// 基于 RAII 的动态数组
///
/// 析构顺序固定为索引顺序：下标 0 的元素最先析构。
pub struct Sequence<T> {
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    growth: Growth<T>,
    _marker: PhantomData<T>,
}

// SAFETY: 只要 T 是 Send，Sequence<T> 就可以跨线程转移所有权
unsafe impl<T: Send> Send for Sequence<T> {}
// SAFETY: 只要 T 是 Sync，Sequence<T> 就可以在多线程间共享引用
unsafe impl<T: Sync> Sync for Sequence<T> {}

impl<T> Sequence<T> {
    /// 创建一个空序列，不分配内存
    pub fn new() -> Self {
        assert!(mem::size_of::<T>() != 0, "Zero-sized types are not supported");
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            len: 0,
            growth: Growth::Relocate,
            _marker: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut seq = Self::new();
        seq.reserve(capacity);
        seq
    }

    /// 扩容时改为逐个复制元素，而不是按位移动
    pub fn duplicate_on_growth(mut self) -> Self
    where
        T: Clone,
    {
        self.growth = Growth::Duplicate(duplicate_into::<T>);
        self
    }

    pub fn growth_policy(&self) -> GrowthPolicy {
        match self.growth {
            Growth::Relocate => GrowthPolicy::Relocate,
            Growth::Duplicate(_) => GrowthPolicy::Duplicate,
        }
    }

    /// 当前元素数量
    #[doc(alias = "size")]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// 移入一个已拥有的值
    pub fn push(&mut self, elem: T) {
        let slot = self.next_slot();
        unsafe {
            // SAFETY: next_slot 保证 slot 位于已分配且未初始化的区域
            ptr::write(slot, elem);
        }
        // 只有在写入成功后才增加 len
        self.len += 1;
    }

    /// 复制调用方的实例到序列存储中，调用方的实例保持不变
    pub fn append_by_copy(&mut self, elem: &T)
    where
        T: Clone,
    {
        let slot = self.next_slot();
        let copy = elem.clone();
        unsafe {
            ptr::write(slot, copy);
        }
        self.len += 1;
    }

    /// 在序列存储中直接由参数构造新元素
    pub fn append_in_place<A>(&mut self, args: A)
    where
        T: Construct<A>,
    {
        let slot = self.next_slot();
        unsafe {
            ptr::write(slot, T::construct(args));
        }
        self.len += 1;
    }

    pub fn insert<A>(&mut self, insertion: Insertion<'_, T, A>)
    where
        T: Clone + Construct<A>,
    {
        match insertion {
            Insertion::ByValue(elem) => self.append_by_copy(elem),
            Insertion::ByConstruction(args) => self.append_in_place(args),
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            unsafe {
                // SAFETY: len 已减 1，该位置是有效的已初始化元素
                Some(ptr::read(self.ptr.as_ptr().add(self.len)))
            }
        }
    }

    /// 按索引顺序析构所有元素，保留容量
    pub fn clear(&mut self) {
        let len = self.len;
        // 先置零，析构中途 panic 时不会重复析构
        self.len = 0;
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), len));
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        match self.try_reserve(additional) {
            Ok(()) => {}
            Err(TryReserveError::CapacityOverflow) => panic!("Capacity overflow"),
            Err(TryReserveError::AllocFailed { capacity }) => {
                handle_alloc_error(array_layout::<T>(capacity).unwrap_or_else(|_| Layout::new::<T>()))
            }
        }
    }

    /// 尝试预留容量（OOM 防护接口）
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(TryReserveError::CapacityOverflow)?;
        if required > self.cap {
            self.grow_to(required)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.deref().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.deref_mut().iter_mut()
    }

    /// 返回下一个可写位置，必要时先扩容
    fn next_slot(&mut self) -> *mut T {
        if self.len == self.cap {
            let new_cap = if self.cap == 0 { 1 } else { self.cap * 2 };
            if let Err(err) = self.grow_to(new_cap) {
                match err {
                    TryReserveError::CapacityOverflow => panic!("Capacity overflow"),
                    TryReserveError::AllocFailed { capacity } => {
                        handle_alloc_error(array_layout::<T>(capacity).unwrap_or_else(|_| Layout::new::<T>()))
                    }
                }
            }
        }
        unsafe { self.ptr.as_ptr().add(self.len) }
    }

    fn grow_to(&mut self, new_cap: usize) -> Result<(), TryReserveError> {
        let new_layout = array_layout::<T>(new_cap)?;
        let duplicate = match self.growth {
            Growth::Duplicate(duplicate) if self.len > 0 => Some(duplicate),
            _ => None,
        };
        match duplicate {
            Some(duplicate) => self.grow_by_duplication(new_cap, new_layout, duplicate),
            None => self.grow_by_relocation(new_cap, new_layout),
        }
    }

    fn grow_by_relocation(&mut self, new_cap: usize, new_layout: Layout) -> Result<(), TryReserveError> {
        let new_ptr = if self.cap == 0 {
            unsafe { alloc(new_layout) }
        } else {
            let old_layout = array_layout::<T>(self.cap)?;
            unsafe { realloc(self.ptr.as_ptr() as *mut u8, old_layout, new_layout.size()) }
        };

        self.ptr = NonNull::new(new_ptr as *mut T)
            .ok_or(TryReserveError::AllocFailed { capacity: new_cap })?;
        self.cap = new_cap;
        Ok(())
    }

    fn grow_by_duplication(
        &mut self,
        new_cap: usize,
        new_layout: Layout,
        duplicate: DuplicateFn<T>,
    ) -> Result<(), TryReserveError> {
        let new_ptr = NonNull::new(unsafe { alloc(new_layout) } as *mut T)
            .ok_or(TryReserveError::AllocFailed { capacity: new_cap })?;

        // duplicate panic 时由它自己清理已复制的元素，这里只需释放新内存
        let block = BlockGuard { ptr: new_ptr.as_ptr() as *mut u8, layout: new_layout };
        unsafe {
            duplicate(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len);
        }
        mem::forget(block);

        let old_ptr = self.ptr;
        let old_layout = array_layout::<T>(self.cap)?;
        let len = self.len;
        self.ptr = new_ptr;
        self.cap = new_cap;

        unsafe {
            // 1. 按索引顺序析构旧元素
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(old_ptr.as_ptr(), len));
            // 2. 释放旧内存块
            dealloc(old_ptr.as_ptr() as *mut u8, old_layout);
        }
        Ok(())
    }
}

fn array_layout<T>(cap: usize) -> Result<Layout, TryReserveError> {
    let layout = Layout::array::<T>(cap).map_err(|_| TryReserveError::CapacityOverflow)?;
    if layout.size() > isize::MAX as usize {
        return Err(TryReserveError::CapacityOverflow);
    }
    Ok(layout)
}

/// 将 src 的前 len 个元素逐个 clone 到 dst
///
/// # Safety
/// src 必须有 len 个已初始化元素，dst 必须有至少 len 个未初始化的位置。
unsafe fn duplicate_into<T: Clone>(src: *const T, dst: *mut T, len: usize) {
    let mut written = WrittenGuard { dst, len: 0 };
    for i in 0..len {
        unsafe {
            let copy = (*src.add(i)).clone();
            ptr::write(dst.add(i), copy);
        }
        written.len += 1;
    }
    mem::forget(written);
}

/// clone 中途 panic 时析构已写入的副本
struct WrittenGuard<T> {
    dst: *mut T,
    len: usize,
}

impl<T> Drop for WrittenGuard<T> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.dst, self.len));
        }
    }
}

struct BlockGuard {
    ptr: *mut u8,
    layout: Layout,
}

impl Drop for BlockGuard {
    fn drop(&mut self) {
        unsafe { dealloc(self.ptr, self.layout) }
    }
}

impl<T> Drop for Sequence<T> {
    fn drop(&mut self) {
        if self.cap != 0 {
            unsafe {
                // 1. 按索引顺序析构所有有效元素
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len));
                // 2. 释放内存块
                let layout = Layout::array::<T>(self.cap).unwrap_unchecked();
                dealloc(self.ptr.as_ptr() as *mut u8, layout);
            }
        }
    }
}

impl<T> Deref for Sequence<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> DerefMut for Sequence<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// 迭代器支持
pub struct IntoIter<T> {
    ptr: NonNull<T>,
    cap: usize,
    start: *const T,
    end: *const T,
    _marker: PhantomData<T>,
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let ptr = self.ptr;
        let cap = self.cap;
        let len = self.len;

        // 关键：避免 Sequence 的 Drop 被调用
        mem::forget(self);

        let start = ptr.as_ptr() as *const T;
        let end = unsafe { start.add(len) };

        IntoIter {
            ptr,
            cap,
            start,
            end,
            _marker: PhantomData,
        }
    }
}

impl<T> IntoIter<T> {
    fn remaining(&self) -> usize {
        (self.end as usize - self.start as usize) / mem::size_of::<T>()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            None
        } else {
            unsafe {
                let result = ptr::read(self.start);
                self.start = self.start.add(1);
                Some(result)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining();
        (len, Some(len))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        unsafe {
            // 1. 析构剩余未消费的元素
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start as *mut T, self.remaining()));
            // 2. 释放内存块
            if self.cap != 0 {
                let layout = Layout::array::<T>(self.cap).unwrap_unchecked();
                dealloc(self.ptr.as_ptr() as *mut u8, layout);
            }
        }
    }
}

// 借用迭代器
impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Sequence<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests;
